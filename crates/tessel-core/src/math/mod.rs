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

//! Integer pixel geometry used to address regions of GPU resources.
//!
//! Sizes ([`Extent3D`]) and native origins ([`Origin3D`]) are unsigned, matching
//! what graphics APIs accept. Regions handed to blit operations ([`IRect`],
//! [`IPoint`]) are signed so that clipping arithmetic can go negative before
//! being intersected back into range.

pub mod dimension;
pub mod geometry;

pub use self::dimension::{Extent3D, Origin3D};
pub use self::geometry::{IPoint, IRect};
