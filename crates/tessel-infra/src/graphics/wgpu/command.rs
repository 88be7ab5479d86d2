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

use std::sync::{Mutex, MutexGuard};
use tessel_core::math::{IPoint, IRect, Origin3D};
use tessel_core::renderer::api::buffer::{BufferUsage, BufferView, DeviceBuffer};
use tessel_core::renderer::api::texture::{Texture, TextureDescriptor, TextureUsage};
use tessel_core::renderer::traits::{BlitEncoder, CommandBuffer};
use tessel_core::renderer::ResourceError;

use super::conversions::IntoWgpu;
use super::device::WgpuDevice;
use super::resources::{WgpuBuffer, WgpuTexture};

/// A command buffer that records into a native `wgpu::CommandEncoder` until it
/// is submitted.
#[derive(Debug)]
pub struct WgpuCommandBuffer {
    // `None` once finished for submission.
    encoder: Mutex<Option<wgpu::CommandEncoder>>,
    device: WgpuDevice,
    label: Option<String>,
}

impl WgpuCommandBuffer {
    pub(crate) fn new(
        device: WgpuDevice,
        encoder: wgpu::CommandEncoder,
        label: Option<String>,
    ) -> Self {
        Self {
            encoder: Mutex::new(Some(encoder)),
            device,
            label,
        }
    }

    pub(crate) fn device(&self) -> &WgpuDevice {
        &self.device
    }

    pub(crate) fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }

    /// Returns `true` while encoders can still be handed out.
    pub fn is_recordable(&self) -> bool {
        self.encoder
            .lock()
            .map(|encoder| encoder.is_some())
            .unwrap_or(false)
    }

    /// Finishes the native encoder. Returns `None` when it was already finished.
    pub(crate) fn finish(&self) -> Result<Option<wgpu::CommandBuffer>, ResourceError> {
        let mut encoder = self.encoder.lock().map_err(|e| {
            ResourceError::BackendError(format!("Command buffer encoder lock poisoned: {e}"))
        })?;
        Ok(encoder.take().map(wgpu::CommandEncoder::finish))
    }
}

impl CommandBuffer for WgpuCommandBuffer {
    fn encoder(&self) -> Option<Box<dyn BlitEncoder + '_>> {
        let encoder = match self.encoder.lock() {
            Ok(guard) => guard,
            Err(e) => {
                log::error!(
                    "WgpuCommandBuffer '{}': encoder lock poisoned: {e}",
                    self.label_str()
                );
                return None;
            }
        };
        if encoder.is_none() {
            log::debug!(
                "WgpuCommandBuffer '{}': already submitted, no encoder available.",
                self.label_str()
            );
            return None;
        }
        Some(Box::new(WgpuBlitEncoder {
            encoder,
            device: &self.device,
        }))
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Row layout of a tightly packed texture region in buffer memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TexelRows {
    /// The row pitch to hand to wgpu; `None` for single-row copies.
    pub(crate) bytes_per_row: Option<u32>,
    /// The number of bytes the copy touches.
    pub(crate) byte_size: u64,
}

/// Computes the buffer layout of a `width` x `height` region.
///
/// Buffer copies spanning more than one row need a row pitch that is a multiple
/// of [`wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`]; the pitch is never padded here.
pub(crate) fn texel_rows(
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
) -> Result<TexelRows, ResourceError> {
    let bytes_per_row = width
        .checked_mul(bytes_per_pixel)
        .ok_or(ResourceError::OutOfBounds)?;
    let byte_size = u64::from(bytes_per_row) * u64::from(height);

    if height <= 1 {
        return Ok(TexelRows {
            bytes_per_row: None,
            byte_size,
        });
    }
    if bytes_per_row % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT != 0 {
        return Err(ResourceError::UnalignedCopy {
            bytes_per_row,
            alignment: wgpu::COPY_BYTES_PER_ROW_ALIGNMENT,
        });
    }
    Ok(TexelRows {
        bytes_per_row: Some(bytes_per_row),
        byte_size,
    })
}

/// The wgpu implementation of [`BlitEncoder`].
///
/// Holds the command buffer's encoder lock for the whole session. Each call
/// checks its arguments first so that a bad command fails with a
/// [`ResourceError`] instead of a wgpu validation error at submission.
pub struct WgpuBlitEncoder<'a> {
    encoder: MutexGuard<'a, Option<wgpu::CommandEncoder>>,
    device: &'a WgpuDevice,
}

impl WgpuBlitEncoder<'_> {
    fn native(&mut self) -> Result<&mut wgpu::CommandEncoder, ResourceError> {
        self.encoder.as_mut().ok_or_else(|| {
            ResourceError::BackendError("Command encoder was already finished".to_string())
        })
    }

    fn texture<'t>(&self, texture: &'t dyn Texture) -> Result<&'t WgpuTexture, ResourceError> {
        let texture = texture
            .as_any()
            .downcast_ref::<WgpuTexture>()
            .ok_or(ResourceError::InvalidHandle)?;
        if texture.device_id != self.device.id() {
            return Err(ResourceError::InvalidHandle);
        }
        Ok(texture)
    }

    fn buffer<'b>(&self, buffer: &'b dyn DeviceBuffer) -> Result<&'b WgpuBuffer, ResourceError> {
        let buffer = buffer
            .as_any()
            .downcast_ref::<WgpuBuffer>()
            .ok_or(ResourceError::InvalidHandle)?;
        if buffer.device_id != self.device.id() {
            return Err(ResourceError::InvalidHandle);
        }
        Ok(buffer)
    }

    fn marker(&mut self, label: Option<&str>) -> Result<(), ResourceError> {
        if let Some(label) = label {
            self.native()?.insert_debug_marker(label);
        }
        Ok(())
    }
}

fn require_texture_usage(
    texture: &WgpuTexture,
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
    buffer: &WgpuBuffer,
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

/// A non-empty region lying inside the base level of `texture`.
fn require_region_in(texture: &WgpuTexture, region: &IRect) -> Result<(), ResourceError> {
    if region.is_empty() {
        return Err(ResourceError::EmptyRegion);
    }
    if !texture.bounds().contains_rect(region) {
        return Err(ResourceError::OutOfBounds);
    }
    Ok(())
}

/// Depth texels only move a whole subresource at a time.
fn require_whole_depth_copy(
    descriptor: &TextureDescriptor<'_>,
    region: &IRect,
) -> Result<(), ResourceError> {
    if descriptor.format.is_depth() && *region != IRect::from_extent(descriptor.size) {
        return Err(ResourceError::UnsupportedFormat(format!(
            "{:?} textures can only be copied whole",
            descriptor.format
        )));
    }
    Ok(())
}

/// Buffer copies address single-sample textures only.
fn require_single_sample(descriptor: &TextureDescriptor<'_>) -> Result<(), ResourceError> {
    if descriptor.sample_count != 1 {
        return Err(ResourceError::UnsupportedFormat(format!(
            "textures with {} samples cannot be copied to or from a buffer",
            descriptor.sample_count
        )));
    }
    Ok(())
}

fn require_buffer_uploadable(descriptor: &TextureDescriptor<'_>) -> Result<(), ResourceError> {
    if descriptor.format.is_depth() {
        return Err(ResourceError::UnsupportedFormat(format!(
            "{:?} textures cannot be written from a buffer",
            descriptor.format
        )));
    }
    Ok(())
}

fn texel_origin(x: i32, y: i32, z: u32) -> wgpu::Origin3d {
    // Callers have checked the region lies inside the texture.
    Origin3D {
        x: x as u32,
        y: y as u32,
        z,
    }
    .into_wgpu()
}

impl BlitEncoder for WgpuBlitEncoder<'_> {
    fn copy_texture_to_texture(
        &mut self,
        source: &dyn Texture,
        destination: &dyn Texture,
        source_region: IRect,
        destination_origin: IPoint,
        label: Option<&str>,
    ) -> Result<(), ResourceError> {
        let source = self.texture(source)?;
        let destination = self.texture(destination)?;
        if std::ptr::eq(source, destination) {
            return Err(ResourceError::OverlappingCopy);
        }

        require_texture_usage(source, TextureUsage::COPY_SRC, "source texture", "COPY_SRC")?;
        require_texture_usage(
            destination,
            TextureUsage::COPY_DST,
            "destination texture",
            "COPY_DST",
        )?;
        if source.format() != destination.format() {
            return Err(ResourceError::FormatMismatch {
                source_format: source.format(),
                destination_format: destination.format(),
            });
        }
        if source.descriptor().sample_count != destination.descriptor().sample_count {
            return Err(ResourceError::SampleCountMismatch {
                source_count: source.descriptor().sample_count,
                destination_count: destination.descriptor().sample_count,
            });
        }

        require_region_in(source, &source_region)?;
        let destination_region = IRect::new(
            destination_origin.x,
            destination_origin.y,
            source_region.width,
            source_region.height,
        );
        require_region_in(destination, &destination_region)?;
        require_whole_depth_copy(source.descriptor(), &source_region)?;
        require_whole_depth_copy(destination.descriptor(), &destination_region)?;

        self.marker(label)?;
        self.native()?.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: source.wgpu_texture(),
                mip_level: 0,
                origin: texel_origin(source_region.x, source_region.y, 0),
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: destination.wgpu_texture(),
                mip_level: 0,
                origin: texel_origin(destination_origin.x, destination_origin.y, 0),
                aspect: wgpu::TextureAspect::All,
            },
            source_region.into_wgpu(),
        );
        Ok(())
    }

    fn copy_texture_to_buffer(
        &mut self,
        source: &dyn Texture,
        destination: &dyn DeviceBuffer,
        source_region: IRect,
        destination_offset: u64,
        label: Option<&str>,
    ) -> Result<(), ResourceError> {
        let source = self.texture(source)?;
        let destination = self.buffer(destination)?;

        require_texture_usage(source, TextureUsage::COPY_SRC, "source texture", "COPY_SRC")?;
        require_buffer_usage(
            destination,
            BufferUsage::COPY_DST,
            "destination buffer",
            "COPY_DST",
        )?;
        require_single_sample(source.descriptor())?;
        require_region_in(source, &source_region)?;
        require_whole_depth_copy(source.descriptor(), &source_region)?;

        let bytes_per_pixel = source.format().bytes_per_pixel();
        if destination_offset % u64::from(bytes_per_pixel) != 0 {
            return Err(ResourceError::BackendError(format!(
                "Buffer offset {destination_offset} is not a multiple of the texel size {bytes_per_pixel}"
            )));
        }
        let rows = texel_rows(
            source_region.width as u32,
            source_region.height as u32,
            bytes_per_pixel,
        )?;
        let end = destination_offset
            .checked_add(rows.byte_size)
            .ok_or(ResourceError::OutOfBounds)?;
        if end > destination.size() {
            return Err(ResourceError::OutOfBounds);
        }

        self.marker(label)?;
        self.native()?.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: source.wgpu_texture(),
                mip_level: 0,
                origin: texel_origin(source_region.x, source_region.y, 0),
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: destination.wgpu_buffer(),
                layout: wgpu::TexelCopyBufferLayout {
                    offset: destination_offset,
                    bytes_per_row: rows.bytes_per_row,
                    rows_per_image: None,
                },
            },
            source_region.into_wgpu(),
        );
        Ok(())
    }

    fn copy_buffer_to_texture(
        &mut self,
        source: &BufferView,
        destination: &dyn Texture,
        destination_region: IRect,
        label: Option<&str>,
        slice: u32,
    ) -> Result<(), ResourceError> {
        let buffer = self.buffer(source.buffer.as_ref())?;
        let destination = self.texture(destination)?;

        require_buffer_usage(buffer, BufferUsage::COPY_SRC, "source buffer", "COPY_SRC")?;
        require_texture_usage(
            destination,
            TextureUsage::COPY_DST,
            "destination texture",
            "COPY_DST",
        )?;
        require_single_sample(destination.descriptor())?;
        require_buffer_uploadable(destination.descriptor())?;

        let layer_count = destination.array_layer_count();
        if slice >= layer_count {
            return Err(ResourceError::InvalidSlice { slice, layer_count });
        }
        require_region_in(destination, &destination_region)?;
        if !source.is_in_bounds() {
            return Err(ResourceError::OutOfBounds);
        }

        let bytes_per_pixel = destination.format().bytes_per_pixel();
        if source.range.start % u64::from(bytes_per_pixel) != 0 {
            return Err(ResourceError::BackendError(format!(
                "Buffer offset {} is not a multiple of the texel size {bytes_per_pixel}",
                source.range.start
            )));
        }
        let rows = texel_rows(
            destination_region.width as u32,
            destination_region.height as u32,
            bytes_per_pixel,
        )?;
        if source.len() < rows.byte_size {
            return Err(ResourceError::OutOfBounds);
        }

        self.marker(label)?;
        self.native()?.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: buffer.wgpu_buffer(),
                layout: wgpu::TexelCopyBufferLayout {
                    offset: source.range.start,
                    bytes_per_row: rows.bytes_per_row,
                    rows_per_image: None,
                },
            },
            wgpu::TexelCopyTextureInfo {
                texture: destination.wgpu_texture(),
                mip_level: 0,
                origin: texel_origin(destination_region.x, destination_region.y, slice),
                aspect: wgpu::TextureAspect::All,
            },
            destination_region.into_wgpu(),
        );
        Ok(())
    }

    fn generate_mipmap(
        &mut self,
        texture: &dyn Texture,
        label: Option<&str>,
    ) -> Result<(), ResourceError> {
        let texture = self.texture(texture)?;
        let device = self.device;
        super::mipmap::MipmapGenerator::check_texture(device.wgpu_device(), texture)?;

        self.marker(label)?;
        let encoder = self.native()?;
        device
            .mipmaps()
            .generate(device.wgpu_device(), encoder, texture)
    }

    fn push_debug_group(&mut self, label: &str) {
        match self.native() {
            Ok(encoder) => encoder.push_debug_group(label),
            Err(e) => log::warn!("WgpuBlitEncoder: cannot push debug group '{label}': {e}"),
        }
    }

    fn pop_debug_group(&mut self) {
        match self.native() {
            Ok(encoder) => encoder.pop_debug_group(),
            Err(e) => log::warn!("WgpuBlitEncoder: cannot pop debug group: {e}"),
        }
    }
}
