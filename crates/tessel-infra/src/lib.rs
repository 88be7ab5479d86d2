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

//! Concrete backend implementations of the `tessel-core` contracts.
//!
//! The `graphics` feature (enabled by default) provides a headless wgpu
//! backend: resources, a command buffer whose encoder replays blit passes, and
//! a render-based mipmap generator.

#[cfg(feature = "graphics")]
pub mod graphics;
