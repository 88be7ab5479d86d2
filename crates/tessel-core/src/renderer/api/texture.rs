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

//! Defines data structures related to GPU texture resources.

use crate::math::{Extent3D, IRect};
use crate::tessel_bitflags;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;

/// The dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// A one-dimensional texture.
    D1,
    /// A two-dimensional texture, possibly with array layers.
    D2,
    /// A three-dimensional (volumetric) texture.
    D3,
}

/// Defines the memory format of texels in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// One 8-bit unsigned normalized component.
    R8Unorm,
    /// Two 8-bit unsigned normalized components.
    Rg8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA).
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA) in the sRGB color space.
    Rgba8UnormSrgb,
    /// Four 8-bit unsigned normalized components (BGRA).
    Bgra8Unorm,
    /// Four 8-bit unsigned normalized components (BGRA) in the sRGB color space.
    Bgra8UnormSrgb,
    /// One 16-bit float component.
    R16Float,
    /// Two 16-bit float components.
    Rg16Float,
    /// Four 16-bit float components.
    Rgba16Float,
    /// One 32-bit float component.
    R32Float,
    /// Two 32-bit float components.
    Rg32Float,
    /// Four 32-bit float components.
    Rgba32Float,
    /// A 32-bit float depth format.
    Depth32Float,
}

impl TextureFormat {
    /// Returns the size in bytes of a single texel for this format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rg8Unorm | TextureFormat::R16Float => 2,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Bgra8UnormSrgb
            | TextureFormat::Rg16Float
            | TextureFormat::R32Float
            | TextureFormat::Depth32Float => 4,
            TextureFormat::Rgba16Float | TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }

    /// Returns `true` for depth formats.
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }
}

tessel_bitflags! {
    /// A set of flags describing the allowed usages of a [`Texture`].
    pub struct TextureUsage: u32 {
        /// The texture can be used as the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The texture can be used as the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The texture can be bound in a shader for sampling (reading).
        const TEXTURE_BINDING = 1 << 2;
        /// The texture can be used as a storage texture.
        const STORAGE_BINDING = 1 << 3;
        /// The texture can be used as a color attachment in a render pass.
        const RENDER_ATTACHMENT = 1 << 4;
    }
}

/// A descriptor used to create a [`Texture`].
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The dimensions (width, height, depth/layers) of the texture.
    pub size: Extent3D,
    /// The number of mipmap levels for the texture.
    pub mip_level_count: u32,
    /// The number of samples per texel.
    pub sample_count: u32,
    /// The dimensionality of the texture.
    pub dimension: TextureDimension,
    /// The format of the texels in the texture.
    pub format: TextureFormat,
    /// A bitmask of [`TextureUsage`] flags describing how the texture will be used.
    pub usage: TextureUsage,
}

impl TextureDescriptor<'_> {
    /// Converts the descriptor into one that owns its label.
    pub fn into_owned(self) -> TextureDescriptor<'static> {
        TextureDescriptor {
            label: self.label.map(|l| Cow::Owned(l.into_owned())),
            size: self.size,
            mip_level_count: self.mip_level_count,
            sample_count: self.sample_count,
            dimension: self.dimension,
            format: self.format,
            usage: self.usage,
        }
    }
}

/// A shared, backend-owned GPU texture.
///
/// Blit commands hold textures as `Arc<dyn Texture>`; the reference count is what
/// keeps a texture alive between recording and encoding. Backends recover their
/// concrete type through [`Texture::as_any`].
pub trait Texture: fmt::Debug + Send + Sync {
    /// The descriptor the texture was created with.
    fn descriptor(&self) -> &TextureDescriptor<'static>;

    /// Returns the underlying object as `Any` for backend downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The size of the base mip level.
    fn size(&self) -> Extent3D {
        self.descriptor().size
    }

    /// The texel format.
    fn format(&self) -> TextureFormat {
        self.descriptor().format
    }

    /// The number of addressable array layers.
    ///
    /// Only 2D textures expose their third dimension as layers.
    fn array_layer_count(&self) -> u32 {
        match self.descriptor().dimension {
            TextureDimension::D2 => self.descriptor().size.depth_or_array_layers,
            TextureDimension::D1 | TextureDimension::D3 => 1,
        }
    }

    /// The full base level as a rectangle at `(0, 0)`.
    fn bounds(&self) -> IRect {
        IRect::from_extent(self.size())
    }

    /// The debug label, if any.
    fn label(&self) -> Option<&str> {
        self.descriptor().label.as_deref()
    }
}
