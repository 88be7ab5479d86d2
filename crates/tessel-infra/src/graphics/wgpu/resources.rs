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

//! Backend-owned textures and buffers.
//!
//! Both types keep the descriptor they were created with next to the native
//! handle, and remember which [`WgpuDevice`](super::WgpuDevice) created them so
//! encoders can reject foreign resources.

use std::any::Any;
use tessel_core::renderer::api::buffer::{BufferDescriptor, DeviceBuffer};
use tessel_core::renderer::api::texture::{Texture, TextureDescriptor};

/// A texture created by a [`WgpuDevice`](super::WgpuDevice).
#[derive(Debug)]
pub struct WgpuTexture {
    pub(crate) descriptor: TextureDescriptor<'static>,
    pub(crate) texture: wgpu::Texture,
    pub(crate) device_id: u64,
}

impl WgpuTexture {
    /// The native wgpu texture.
    pub fn wgpu_texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

impl Texture for WgpuTexture {
    fn descriptor(&self) -> &TextureDescriptor<'static> {
        &self.descriptor
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A buffer created by a [`WgpuDevice`](super::WgpuDevice).
#[derive(Debug)]
pub struct WgpuBuffer {
    pub(crate) descriptor: BufferDescriptor<'static>,
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) device_id: u64,
}

impl WgpuBuffer {
    /// The native wgpu buffer.
    pub fn wgpu_buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl DeviceBuffer for WgpuBuffer {
    fn descriptor(&self) -> &BufferDescriptor<'static> {
        &self.descriptor
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
