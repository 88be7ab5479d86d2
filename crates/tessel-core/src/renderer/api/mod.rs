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

//! Backend-agnostic transfer API.
//!
//! - **[`texture`]** / **[`buffer`]**: shared GPU resource handles and their descriptors.
//! - **[`command`]**: the recorded blit command variants.
//! - **[`settings`]**: runtime configuration for recording and encoding.

pub mod buffer;
pub mod command;
pub mod settings;
pub mod texture;

pub use self::buffer::{BufferDescriptor, BufferUsage, BufferView, DeviceBuffer};
pub use self::command::{
    BlitCommand, CopyBufferToTextureCommand, CopyTextureToBufferCommand,
    CopyTextureToTextureCommand, GenerateMipmapCommand,
};
pub use self::settings::BlitSettings;
pub use self::texture::{Texture, TextureDescriptor, TextureDimension, TextureFormat, TextureUsage};
