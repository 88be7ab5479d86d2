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

//! Provides the public, backend-agnostic transfer contracts.
//!
//! This module defines the resource traits ([`Texture`], [`DeviceBuffer`]), the
//! collaborator traits a graphics backend implements ([`CommandBuffer`],
//! [`BlitEncoder`]), and the [`BlitPass`] which records blit commands against
//! them. Concrete backends live in the `tessel-infra` crate (e.g. a WGPU backend)
//! and only have to implement the traits; the recording and replay logic stays
//! here.

pub mod api;
pub mod blit_pass;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::blit_pass::BlitPass;
pub use self::error::{BlitPassError, ResourceError};
pub use self::traits::{BlitEncoder, CommandBuffer};
