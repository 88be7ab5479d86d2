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

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use wgpu::util::DeviceExt;

use tessel_core::math::IRect;
use tessel_core::renderer::api::buffer::{BufferDescriptor, BufferUsage, DeviceBuffer};
use tessel_core::renderer::api::texture::{Texture, TextureDescriptor, TextureUsage};
use tessel_core::renderer::ResourceError;

use super::command::WgpuCommandBuffer;
use super::context::WgpuGraphicsContext;
use super::conversions::IntoWgpu;
use super::mipmap::{MipmapGenerator, MipmapSettings};
use super::resources::{WgpuBuffer, WgpuTexture};

static NEXT_DEVICE_ID: AtomicU64 = AtomicU64::new(1);

/// This struct holds all the GPU state shared by the clones of a [`WgpuDevice`].
#[derive(Debug)]
pub(crate) struct WgpuDeviceInternal {
    id: u64,
    context: WgpuGraphicsContext,
    mipmaps: MipmapGenerator,
}

/// A cloneable handle to a headless wgpu device.
///
/// Every resource it creates is tagged with the device's identity; encoders of
/// command buffers created here refuse resources from any other device.
#[derive(Debug, Clone)]
pub struct WgpuDevice {
    internal: Arc<WgpuDeviceInternal>,
}

impl WgpuDevice {
    pub fn new(context: WgpuGraphicsContext, mipmap_settings: MipmapSettings) -> Self {
        let mipmaps = MipmapGenerator::new(&context.device, mipmap_settings);
        let id = NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "WgpuDevice: ready on \"{}\" ({:?}), id {id}.",
            context.adapter_name,
            context.adapter_backend
        );
        Self {
            internal: Arc::new(WgpuDeviceInternal {
                id,
                context,
                mipmaps,
            }),
        }
    }

    /// Creates a headless context and wraps it with default mipmap settings.
    pub fn new_headless_blocking(label: Option<&str>) -> anyhow::Result<Self> {
        let context = WgpuGraphicsContext::new_headless_blocking(label)?;
        Ok(Self::new(context, MipmapSettings::default()))
    }

    pub(crate) fn id(&self) -> u64 {
        self.internal.id
    }

    pub fn context(&self) -> &WgpuGraphicsContext {
        &self.internal.context
    }

    pub fn wgpu_device(&self) -> &wgpu::Device {
        &self.internal.context.device
    }

    pub fn wgpu_queue(&self) -> &wgpu::Queue {
        &self.internal.context.queue
    }

    pub(crate) fn mipmaps(&self) -> &MipmapGenerator {
        &self.internal.mipmaps
    }

    // --- Texture Operations ---

    /// Creates a texture after checking the descriptor against what wgpu accepts.
    pub fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<WgpuTexture>, ResourceError> {
        let size = descriptor.size;
        if size.width == 0 || size.height == 0 || size.depth_or_array_layers == 0 {
            return Err(ResourceError::BackendError(format!(
                "Texture size {}x{}x{} has a zero dimension",
                size.width, size.height, size.depth_or_array_layers
            )));
        }
        if descriptor.mip_level_count == 0 || descriptor.mip_level_count > size.max_mip_levels() {
            return Err(ResourceError::InvalidMipChain {
                mip_level_count: descriptor.mip_level_count,
            });
        }

        let texture = self.wgpu_device().create_texture(&wgpu::TextureDescriptor {
            label: descriptor.label.as_deref(),
            size: size.into_wgpu(),
            mip_level_count: descriptor.mip_level_count,
            sample_count: descriptor.sample_count,
            dimension: descriptor.dimension.into_wgpu(),
            format: descriptor.format.into_wgpu(),
            usage: descriptor.usage.into_wgpu(),
            view_formats: &[],
        });

        log::info!(
            "WgpuDevice: Created texture '{}' ({}x{}x{}, {:?}, {} mip level(s))",
            descriptor.label.as_deref().unwrap_or_default(),
            size.width,
            size.height,
            size.depth_or_array_layers,
            descriptor.format,
            descriptor.mip_level_count
        );

        Ok(Arc::new(WgpuTexture {
            descriptor: descriptor.clone().into_owned(),
            texture,
            device_id: self.id(),
        }))
    }

    /// Uploads tightly packed texels into `region` of array layer `slice` through
    /// the queue.
    pub fn write_texture(
        &self,
        texture: &WgpuTexture,
        data: &[u8],
        region: IRect,
        slice: u32,
    ) -> Result<(), ResourceError> {
        if texture.device_id != self.id() {
            return Err(ResourceError::InvalidHandle);
        }
        if !texture.descriptor().usage.contains(TextureUsage::COPY_DST) {
            return Err(ResourceError::MissingUsage {
                resource: "destination texture",
                usage: "COPY_DST",
            });
        }
        if !texture.bounds().contains_rect(&region) {
            return Err(ResourceError::OutOfBounds);
        }
        let layer_count = texture.array_layer_count();
        if slice >= layer_count {
            return Err(ResourceError::InvalidSlice { slice, layer_count });
        }

        let bytes_per_row = region.width as u32 * texture.format().bytes_per_pixel();
        if (data.len() as u64) < region.area() * u64::from(texture.format().bytes_per_pixel()) {
            return Err(ResourceError::OutOfBounds);
        }

        self.wgpu_queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: texture.wgpu_texture(),
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: region.x as u32,
                    y: region.y as u32,
                    z: slice,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: None,
            },
            region.into_wgpu(),
        );
        log::debug!(
            "WgpuDevice: Wrote {} bytes to texture '{}' at {:?}, slice {slice}",
            data.len(),
            texture.label().unwrap_or_default(),
            region
        );
        Ok(())
    }

    // --- Buffer Operations ---

    /// Creates a buffer.
    ///
    /// Mappable buffers may only be combined with the copy usage pointing the
    /// other way (`MAP_READ | COPY_DST`, `MAP_WRITE | COPY_SRC`).
    pub fn create_buffer(
        &self,
        descriptor: &BufferDescriptor,
    ) -> Result<Arc<WgpuBuffer>, ResourceError> {
        Self::check_buffer_usage(descriptor.usage)?;

        let buffer = self.wgpu_device().create_buffer(&wgpu::BufferDescriptor {
            label: descriptor.label.as_deref(),
            size: descriptor.size,
            usage: descriptor.usage.into_wgpu(),
            mapped_at_creation: false,
        });

        log::info!(
            "WgpuDevice: Created buffer '{}', size: {} bytes",
            descriptor.label.as_deref().unwrap_or_default(),
            descriptor.size
        );

        Ok(Arc::new(WgpuBuffer {
            descriptor: descriptor.clone().into_owned(),
            buffer,
            device_id: self.id(),
        }))
    }

    /// Creates a buffer initialized with `data`.
    pub fn create_buffer_with_data(
        &self,
        label: Option<&str>,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<Arc<WgpuBuffer>, ResourceError> {
        Self::check_buffer_usage(usage)?;

        let buffer = self
            .wgpu_device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents: data,
                usage: usage.into_wgpu(),
            });

        log::info!(
            "WgpuDevice: Created buffer '{}' with initial data, size: {} bytes",
            label.unwrap_or_default(),
            data.len()
        );

        Ok(Arc::new(WgpuBuffer {
            descriptor: BufferDescriptor {
                label: label.map(|l| l.to_owned().into()),
                size: data.len() as u64,
                usage,
            },
            buffer,
            device_id: self.id(),
        }))
    }

    fn check_buffer_usage(usage: BufferUsage) -> Result<(), ResourceError> {
        if usage.contains(BufferUsage::MAP_READ)
            && !(BufferUsage::MAP_READ | BufferUsage::COPY_DST).contains(usage)
        {
            return Err(ResourceError::BackendError(format!(
                "MAP_READ buffers may only add COPY_DST, got {usage:?}"
            )));
        }
        if usage.contains(BufferUsage::MAP_WRITE)
            && !(BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC).contains(usage)
        {
            return Err(ResourceError::BackendError(format!(
                "MAP_WRITE buffers may only add COPY_SRC, got {usage:?}"
            )));
        }
        Ok(())
    }

    /// Maps `range` of a `MAP_READ` buffer, waits for the device, and copies the bytes out.
    pub fn read_buffer_blocking(
        &self,
        buffer: &WgpuBuffer,
        range: Range<u64>,
    ) -> Result<Vec<u8>, ResourceError> {
        if buffer.device_id != self.id() {
            return Err(ResourceError::InvalidHandle);
        }
        if !buffer.descriptor().usage.contains(BufferUsage::MAP_READ) {
            return Err(ResourceError::MissingUsage {
                resource: "read-back buffer",
                usage: "MAP_READ",
            });
        }
        if range.start >= range.end || range.end > buffer.size() {
            return Err(ResourceError::OutOfBounds);
        }
        if range.start % wgpu::MAP_ALIGNMENT != 0
            || (range.end - range.start) % wgpu::COPY_BUFFER_ALIGNMENT != 0
        {
            return Err(ResourceError::BackendError(format!(
                "Mapped range {range:?} is not aligned for mapping"
            )));
        }

        let slice = buffer.wgpu_buffer().slice(range.clone());
        let (sender, receiver) = flume::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.poll_device_blocking();

        receiver
            .recv()
            .map_err(|e| ResourceError::BackendError(format!("Map callback dropped: {e}")))?
            .map_err(|e| ResourceError::BackendError(format!("Failed to map buffer: {e}")))?;

        let data = slice.get_mapped_range().to_vec();
        buffer.wgpu_buffer().unmap();

        log::debug!(
            "WgpuDevice: Read {} bytes back from buffer '{}'",
            data.len(),
            buffer.label().unwrap_or_default()
        );
        Ok(data)
    }

    // --- Command Submission ---

    /// Creates a recordable command buffer.
    pub fn create_command_buffer(&self, label: Option<&str>) -> Arc<WgpuCommandBuffer> {
        let encoder = self
            .wgpu_device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label });
        Arc::new(WgpuCommandBuffer::new(
            self.clone(),
            encoder,
            label.map(str::to_owned),
        ))
    }

    /// Finishes `command_buffer` and submits it to the queue.
    ///
    /// The command buffer stops handing out encoders afterwards.
    pub fn submit(&self, command_buffer: &WgpuCommandBuffer) -> Result<(), ResourceError> {
        if command_buffer.device().id() != self.id() {
            return Err(ResourceError::InvalidHandle);
        }
        let finished = command_buffer.finish()?.ok_or_else(|| {
            ResourceError::BackendError(format!(
                "Command buffer '{}' was already submitted",
                command_buffer.label_str()
            ))
        })?;
        self.wgpu_queue().submit(std::iter::once(finished));
        log::debug!(
            "WgpuDevice: Submitted command buffer '{}'",
            command_buffer.label_str()
        );
        Ok(())
    }

    /// Polls the underlying wgpu::Device in a blocking manner, waiting for the
    /// queue to drain and pending map callbacks to run.
    pub fn poll_device_blocking(&self) {
        if let Err(e) = self
            .wgpu_device()
            .poll(wgpu::PollType::wait_indefinitely())
        {
            log::warn!("Failed to poll device: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mappable_buffers_accept_only_the_opposite_copy() {
        assert!(
            WgpuDevice::check_buffer_usage(BufferUsage::MAP_READ | BufferUsage::COPY_DST).is_ok()
        );
        assert!(
            WgpuDevice::check_buffer_usage(BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC).is_ok()
        );
        assert!(
            WgpuDevice::check_buffer_usage(BufferUsage::COPY_SRC | BufferUsage::COPY_DST).is_ok()
        );
        assert!(
            WgpuDevice::check_buffer_usage(BufferUsage::MAP_READ | BufferUsage::COPY_SRC).is_err()
        );
        assert!(
            WgpuDevice::check_buffer_usage(BufferUsage::MAP_WRITE | BufferUsage::MAP_READ)
                .is_err()
        );
    }
}
