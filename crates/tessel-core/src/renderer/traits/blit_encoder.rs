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

use crate::math::{IPoint, IRect};
use crate::renderer::api::{BufferView, DeviceBuffer, Texture};
use crate::renderer::error::ResourceError;

/// An encoder session translating blit intents into a backend's native command stream.
///
/// Each method issues exactly one native transfer (or mipmap generation) and
/// reports whether it could be recorded. Labels are diagnostic only and never
/// affect the outcome.
pub trait BlitEncoder {
    /// Records a copy of `source_region` of `source` into `destination`, placing
    /// the region's top-left corner at `destination_origin`.
    fn copy_texture_to_texture(
        &mut self,
        source: &dyn Texture,
        destination: &dyn Texture,
        source_region: IRect,
        destination_origin: IPoint,
        label: Option<&str>,
    ) -> Result<(), ResourceError>;

    /// Records a read-back of `source_region` of `source` into `destination`,
    /// tightly packed and starting at `destination_offset` bytes.
    fn copy_texture_to_buffer(
        &mut self,
        source: &dyn Texture,
        destination: &dyn DeviceBuffer,
        source_region: IRect,
        destination_offset: u64,
        label: Option<&str>,
    ) -> Result<(), ResourceError>;

    /// Records an upload of the bytes in `source` into `destination_region` of
    /// array layer `slice` of `destination`.
    fn copy_buffer_to_texture(
        &mut self,
        source: &BufferView,
        destination: &dyn Texture,
        destination_region: IRect,
        label: Option<&str>,
        slice: u32,
    ) -> Result<(), ResourceError>;

    /// Records generation of every mip level of `texture` from its base level.
    fn generate_mipmap(&mut self, texture: &dyn Texture, label: Option<&str>)
        -> Result<(), ResourceError>;

    /// Opens a named debug group. Backends without debug markers ignore it.
    fn push_debug_group(&mut self, _label: &str) {}

    /// Closes the innermost debug group.
    fn pop_debug_group(&mut self) {}
}
