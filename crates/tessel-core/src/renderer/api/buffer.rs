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

//! Defines data structures related to GPU buffer resources.

use crate::tessel_bitflags;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

tessel_bitflags! {
    /// A set of flags describing the allowed usages of a [`DeviceBuffer`].
    pub struct BufferUsage: u32 {
        /// The buffer can be mapped for reading on the CPU.
        const MAP_READ = 1 << 0;
        /// The buffer can be mapped for writing on the CPU.
        const MAP_WRITE = 1 << 1;
        /// The buffer can be used as the source of a copy operation.
        const COPY_SRC = 1 << 2;
        /// The buffer can be used as the destination of a copy operation.
        const COPY_DST = 1 << 3;
    }
}

/// A descriptor used to create a [`DeviceBuffer`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// A bitmask of [`BufferUsage`] flags describing how the buffer will be used.
    pub usage: BufferUsage,
}

impl BufferDescriptor<'_> {
    /// Converts the descriptor into one that owns its label.
    pub fn into_owned(self) -> BufferDescriptor<'static> {
        BufferDescriptor {
            label: self.label.map(|l| Cow::Owned(l.into_owned())),
            size: self.size,
            usage: self.usage,
        }
    }
}

/// A shared, backend-owned GPU buffer.
pub trait DeviceBuffer: fmt::Debug + Send + Sync {
    /// The descriptor the buffer was created with.
    fn descriptor(&self) -> &BufferDescriptor<'static>;

    /// Returns the underlying object as `Any` for backend downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The total size in bytes.
    fn size(&self) -> u64 {
        self.descriptor().size
    }

    /// The debug label, if any.
    fn label(&self) -> Option<&str> {
        self.descriptor().label.as_deref()
    }
}

/// A byte range inside a shared [`DeviceBuffer`], used as the source of uploads.
#[derive(Debug, Clone)]
pub struct BufferView {
    /// The buffer the range points into.
    pub buffer: Arc<dyn DeviceBuffer>,
    /// The byte range, relative to the start of the buffer.
    pub range: Range<u64>,
}

impl BufferView {
    /// Creates a view over `range` of `buffer`.
    pub fn new(buffer: Arc<dyn DeviceBuffer>, range: Range<u64>) -> Self {
        Self { buffer, range }
    }

    /// Creates a view covering the whole buffer.
    pub fn whole(buffer: Arc<dyn DeviceBuffer>) -> Self {
        let size = buffer.size();
        Self::new(buffer, 0..size)
    }

    /// The number of bytes in the view.
    pub fn len(&self) -> u64 {
        self.range.end.saturating_sub(self.range.start)
    }

    /// Returns `true` when the view covers no byte.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` when the range lies within the buffer.
    pub fn is_in_bounds(&self) -> bool {
        self.range.start <= self.range.end && self.range.end <= self.buffer.size()
    }
}
