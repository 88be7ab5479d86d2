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

//! Unsigned extents and origins describing texture sizes and copy offsets.

/// A three-dimensional extent, representing width, height, and depth.
///
/// For 2D textures the third component counts array layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3D {
    /// The width component of the extent.
    pub width: u32,
    /// The height component of the extent.
    pub height: u32,
    /// The depth or number of array layers.
    pub depth_or_array_layers: u32,
}

impl Extent3D {
    /// Creates a single-layer 2D extent.
    pub const fn new_2d(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth_or_array_layers: 1,
        }
    }

    /// Returns the size of the given mip level of a 2D (array) texture.
    ///
    /// Width and height halve at each level and never drop below one texel.
    /// The layer count is unaffected.
    pub fn mip_level_size(&self, level: u32) -> Self {
        let shrink = |v: u32| v.checked_shr(level).unwrap_or(0).max(1);
        Self {
            width: shrink(self.width),
            height: shrink(self.height),
            depth_or_array_layers: self.depth_or_array_layers,
        }
    }

    /// Returns the number of levels in a full mip chain for this extent.
    pub fn max_mip_levels(&self) -> u32 {
        let largest = self.width.max(self.height).max(1);
        32 - largest.leading_zeros()
    }
}

/// A three-dimensional origin, representing an (x, y, z) offset.
///
/// For 2D array textures `z` selects the array layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Origin3D {
    /// The x-coordinate of the origin.
    pub x: u32,
    /// The y-coordinate of the origin.
    pub y: u32,
    /// The z-coordinate or array layer of the origin.
    pub z: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_level_size_halves_and_clamps() {
        let base = Extent3D::new_2d(16, 4);
        assert_eq!(base.mip_level_size(0), base);
        assert_eq!(base.mip_level_size(1), Extent3D::new_2d(8, 2));
        assert_eq!(base.mip_level_size(3), Extent3D::new_2d(2, 1));
        assert_eq!(base.mip_level_size(40), Extent3D::new_2d(1, 1));
    }

    #[test]
    fn max_mip_levels_follows_largest_side() {
        assert_eq!(Extent3D::new_2d(1, 1).max_mip_levels(), 1);
        assert_eq!(Extent3D::new_2d(256, 16).max_mip_levels(), 9);
        assert_eq!(Extent3D::new_2d(5, 3).max_mip_levels(), 3);
        assert_eq!(Extent3D::new_2d(0, 0).max_mip_levels(), 1);
    }
}
