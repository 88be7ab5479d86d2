// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The four blit command variants and their replay against a [`BlitEncoder`].
//!
//! A command is an immutable snapshot taken at record time. It holds strong
//! shares of its resources so they stay alive until the pass is encoded, and
//! replays as exactly one encoder call.

use crate::math::{IPoint, IRect};
use crate::renderer::api::buffer::{BufferUsage, BufferView, DeviceBuffer};
use crate::renderer::api::texture::{Texture, TextureUsage};
use crate::renderer::error::ResourceError;
use crate::renderer::traits::BlitEncoder;
use std::sync::Arc;

/// Copies a sub-rectangle of texels from one texture into another.
#[derive(Debug, Clone)]
pub struct CopyTextureToTextureCommand {
    /// The texture to read from.
    pub source: Arc<dyn Texture>,
    /// The texture to write to.
    pub destination: Arc<dyn Texture>,
    /// The region of `source` to copy.
    pub source_region: IRect,
    /// Where the top-left corner of the region lands in `destination`.
    pub destination_origin: IPoint,
    /// An optional debug label.
    pub label: Option<String>,
}

/// Reads a texture region back into linear buffer memory.
#[derive(Debug, Clone)]
pub struct CopyTextureToBufferCommand {
    /// The texture to read from.
    pub source: Arc<dyn Texture>,
    /// The buffer to write to.
    pub destination: Arc<dyn DeviceBuffer>,
    /// The region of `source` to copy.
    pub source_region: IRect,
    /// The byte offset in `destination` where the texels start.
    pub destination_offset: u64,
    /// An optional debug label.
    pub label: Option<String>,
}

/// Uploads linear buffer bytes into a region of one texture array slice.
#[derive(Debug, Clone)]
pub struct CopyBufferToTextureCommand {
    /// The bytes to upload.
    pub source: BufferView,
    /// The texture to write to.
    pub destination: Arc<dyn Texture>,
    /// The region of `destination` to fill.
    pub destination_region: IRect,
    /// An optional debug label.
    pub label: Option<String>,
    /// The array layer of `destination` to write.
    pub slice: u32,
}

/// Generates the full mip chain of a texture from its base level.
#[derive(Debug, Clone)]
pub struct GenerateMipmapCommand {
    /// The texture whose levels are generated.
    pub texture: Arc<dyn Texture>,
    /// An optional debug label.
    pub label: Option<String>,
}

/// A single recorded blit operation.
///
/// The set of variants is closed; backends handle each one through the matching
/// [`BlitEncoder`] method.
#[derive(Debug, Clone)]
pub enum BlitCommand {
    /// See [`CopyTextureToTextureCommand`].
    CopyTextureToTexture(CopyTextureToTextureCommand),
    /// See [`CopyTextureToBufferCommand`].
    CopyTextureToBuffer(CopyTextureToBufferCommand),
    /// See [`CopyBufferToTextureCommand`].
    CopyBufferToTexture(CopyBufferToTextureCommand),
    /// See [`GenerateMipmapCommand`].
    GenerateMipmap(GenerateMipmapCommand),
}

impl BlitCommand {
    /// Replays the command as one call on `encoder`.
    pub fn encode(&self, encoder: &mut dyn BlitEncoder) -> Result<(), ResourceError> {
        match self {
            BlitCommand::CopyTextureToTexture(cmd) => encoder.copy_texture_to_texture(
                cmd.source.as_ref(),
                cmd.destination.as_ref(),
                cmd.source_region,
                cmd.destination_origin,
                cmd.label.as_deref(),
            ),
            BlitCommand::CopyTextureToBuffer(cmd) => encoder.copy_texture_to_buffer(
                cmd.source.as_ref(),
                cmd.destination.as_ref(),
                cmd.source_region,
                cmd.destination_offset,
                cmd.label.as_deref(),
            ),
            BlitCommand::CopyBufferToTexture(cmd) => encoder.copy_buffer_to_texture(
                &cmd.source,
                cmd.destination.as_ref(),
                cmd.destination_region,
                cmd.label.as_deref(),
                cmd.slice,
            ),
            BlitCommand::GenerateMipmap(cmd) => {
                encoder.generate_mipmap(cmd.texture.as_ref(), cmd.label.as_deref())
            }
        }
    }

    /// The debug label of the command, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            BlitCommand::CopyTextureToTexture(cmd) => cmd.label.as_deref(),
            BlitCommand::CopyTextureToBuffer(cmd) => cmd.label.as_deref(),
            BlitCommand::CopyBufferToTexture(cmd) => cmd.label.as_deref(),
            BlitCommand::GenerateMipmap(cmd) => cmd.label.as_deref(),
        }
    }

    /// A static name for the kind of command, used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            BlitCommand::CopyTextureToTexture(_) => CopyTextureToTextureCommand::NAME,
            BlitCommand::CopyTextureToBuffer(_) => CopyTextureToBufferCommand::NAME,
            BlitCommand::CopyBufferToTexture(_) => CopyBufferToTextureCommand::NAME,
            BlitCommand::GenerateMipmap(_) => GenerateMipmapCommand::NAME,
        }
    }
}

// --- Record-time validation ---

fn require_texture_usage(
    texture: &dyn Texture,
    usage: TextureUsage,
    resource: &'static str,
    usage_name: &'static str,
) -> Result<(), ResourceError> {
    if texture.descriptor().usage.contains(usage) {
        Ok(())
    } else {
        Err(ResourceError::MissingUsage {
            resource,
            usage: usage_name,
        })
    }
}

fn require_buffer_usage(
    buffer: &dyn DeviceBuffer,
    usage: BufferUsage,
    resource: &'static str,
    usage_name: &'static str,
) -> Result<(), ResourceError> {
    if buffer.descriptor().usage.contains(usage) {
        Ok(())
    } else {
        Err(ResourceError::MissingUsage {
            resource,
            usage: usage_name,
        })
    }
}

fn region_byte_size(region: &IRect, bytes_per_pixel: u32) -> u64 {
    region.area() * u64::from(bytes_per_pixel)
}

impl CopyTextureToTextureCommand {
    /// The kind name of this command.
    pub const NAME: &'static str = "CopyTextureToTexture";

    /// Checks the copy and clips it to both textures.
    ///
    /// The region is first clipped to the source, then to the destination as
    /// seen from the destination origin. The origin moves with the region's
    /// top-left corner.
    pub(crate) fn validate(&mut self) -> Result<(), ResourceError> {
        let source = self.source.descriptor();
        let destination = self.destination.descriptor();

        if source.sample_count != destination.sample_count {
            return Err(ResourceError::SampleCountMismatch {
                source_count: source.sample_count,
                destination_count: destination.sample_count,
            });
        }
        if source.format != destination.format {
            return Err(ResourceError::FormatMismatch {
                source_format: source.format,
                destination_format: destination.format,
            });
        }
        require_texture_usage(
            self.source.as_ref(),
            TextureUsage::COPY_SRC,
            "source texture",
            "COPY_SRC",
        )?;
        require_texture_usage(
            self.destination.as_ref(),
            TextureUsage::COPY_DST,
            "destination texture",
            "COPY_DST",
        )?;

        let clipped = self
            .source_region
            .intersection(&self.source.bounds())
            .ok_or(ResourceError::EmptyRegion)?;

        // Offsets span the full i32 range, so the destination clip runs in i64.
        let dx = i64::from(self.destination_origin.x) - i64::from(self.source_region.x);
        let dy = i64::from(self.destination_origin.y) - i64::from(self.source_region.y);
        let bounds = self.destination.bounds();
        let left = (i64::from(clipped.x) + dx).max(i64::from(bounds.x));
        let top = (i64::from(clipped.y) + dy).max(i64::from(bounds.y));
        let right = (clipped.right() + dx).min(bounds.right());
        let bottom = (clipped.bottom() + dy).min(bounds.bottom());
        if right <= left || bottom <= top {
            return Err(ResourceError::EmptyRegion);
        }

        // Both corners lie inside the destination and, shifted back, inside `clipped`.
        self.source_region = IRect::new(
            (left - dx) as i32,
            (top - dy) as i32,
            (right - left) as i32,
            (bottom - top) as i32,
        );
        self.destination_origin = IPoint::new(left as i32, top as i32);
        Ok(())
    }
}

impl CopyTextureToBufferCommand {
    /// The kind name of this command.
    pub const NAME: &'static str = "CopyTextureToBuffer";

    /// Checks usages, clips the region to the source and bounds-checks the buffer.
    pub(crate) fn validate(&mut self) -> Result<(), ResourceError> {
        require_texture_usage(
            self.source.as_ref(),
            TextureUsage::COPY_SRC,
            "source texture",
            "COPY_SRC",
        )?;
        require_buffer_usage(
            self.destination.as_ref(),
            BufferUsage::COPY_DST,
            "destination buffer",
            "COPY_DST",
        )?;

        let clipped = self
            .source_region
            .intersection(&self.source.bounds())
            .ok_or(ResourceError::EmptyRegion)?;

        let bytes = region_byte_size(&clipped, self.source.format().bytes_per_pixel());
        let end = self
            .destination_offset
            .checked_add(bytes)
            .ok_or(ResourceError::OutOfBounds)?;
        if end > self.destination.size() {
            return Err(ResourceError::OutOfBounds);
        }

        self.source_region = clipped;
        Ok(())
    }
}

impl CopyBufferToTextureCommand {
    /// The kind name of this command.
    pub const NAME: &'static str = "CopyBufferToTexture";

    /// Checks usages, the destination region, the slice and the source range.
    pub(crate) fn validate(&mut self) -> Result<(), ResourceError> {
        require_texture_usage(
            self.destination.as_ref(),
            TextureUsage::COPY_DST,
            "destination texture",
            "COPY_DST",
        )?;
        require_buffer_usage(
            self.source.buffer.as_ref(),
            BufferUsage::COPY_SRC,
            "source buffer",
            "COPY_SRC",
        )?;

        if self.destination_region.is_empty() {
            return Err(ResourceError::EmptyRegion);
        }
        if !self
            .destination
            .bounds()
            .contains_rect(&self.destination_region)
        {
            return Err(ResourceError::OutOfBounds);
        }

        let layer_count = self.destination.array_layer_count();
        if self.slice >= layer_count {
            return Err(ResourceError::InvalidSlice {
                slice: self.slice,
                layer_count,
            });
        }

        let bytes = region_byte_size(
            &self.destination_region,
            self.destination.format().bytes_per_pixel(),
        );
        if !self.source.is_in_bounds() || self.source.len() < bytes {
            return Err(ResourceError::OutOfBounds);
        }
        Ok(())
    }
}

impl GenerateMipmapCommand {
    /// The kind name of this command.
    pub const NAME: &'static str = "GenerateMipmap";

    /// Checks that the texture has levels beyond its base.
    pub(crate) fn validate(&mut self) -> Result<(), ResourceError> {
        let mip_level_count = self.texture.descriptor().mip_level_count;
        if mip_level_count <= 1 {
            return Err(ResourceError::InvalidMipChain { mip_level_count });
        }
        Ok(())
    }
}
