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

//! Signed integer points and rectangles addressing texel regions.

use super::Extent3D;

/// A signed integer point, typically the top-left corner of a copy destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IPoint {
    /// The x-coordinate.
    pub x: i32,
    /// The y-coordinate.
    pub y: i32,
}

impl IPoint {
    /// The origin `(0, 0)`.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Creates a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle of texels, defined by its top-left corner and size.
///
/// A rectangle with a non-positive width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IRect {
    /// The left edge.
    pub x: i32,
    /// The top edge.
    pub y: i32,
    /// The horizontal size in texels.
    pub width: i32,
    /// The vertical size in texels.
    pub height: i32,
}

impl IRect {
    /// Creates a rectangle from its origin and size.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at `(0, 0)` covering the width and height of `extent`.
    ///
    /// Sizes beyond `i32::MAX` saturate.
    pub fn from_extent(extent: Extent3D) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(extent.width).unwrap_or(i32::MAX),
            i32::try_from(extent.height).unwrap_or(i32::MAX),
        )
    }

    /// The top-left corner.
    #[inline]
    pub const fn origin(&self) -> IPoint {
        IPoint::new(self.x, self.y)
    }

    /// The exclusive right edge.
    #[inline]
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// The exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Returns `true` when the rectangle covers no texel.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns the number of texels covered, zero when empty.
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width as u64 * self.height as u64
        }
    }

    /// Returns this rectangle moved by `offset`.
    pub fn translated(&self, offset: IPoint) -> Self {
        Self::new(
            self.x.saturating_add(offset.x),
            self.y.saturating_add(offset.y),
            self.width,
            self.height,
        )
    }

    /// Returns `true` when `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &IRect) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the overlap of both rectangles, or `None` when they do not overlap.
    pub fn intersection(&self, other: &IRect) -> Option<IRect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }

        let left = i64::from(self.x.max(other.x));
        let top = i64::from(self.y.max(other.y));
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }

        // Bounded by the inputs' own i32 extents.
        Some(IRect::new(
            left as i32,
            top as i32,
            (right - left) as i32,
            (bottom - top) as i32,
        ))
    }
}
