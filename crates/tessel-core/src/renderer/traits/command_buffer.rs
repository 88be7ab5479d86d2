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

use crate::renderer::traits::BlitEncoder;

/// A backend command buffer that blit passes are recorded into.
///
/// A command buffer owns (or outlives) the passes created for it, so passes
/// only ever hold a `Weak<dyn CommandBuffer>` and resolve it at encode time.
pub trait CommandBuffer {
    /// Starts an encoder session on this command buffer.
    ///
    /// Returns `None` when the buffer is not in a recordable state, for example
    /// once it has been finished for submission. The returned encoder borrows
    /// the command buffer for the duration of the session.
    fn encoder(&self) -> Option<Box<dyn BlitEncoder + '_>>;

    /// The debug label of the command buffer, if any.
    fn label(&self) -> Option<&str> {
        None
    }
}
