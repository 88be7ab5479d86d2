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

//! The deferred blit pass.
//!
//! A [`BlitPass`] separates *recording* a transfer from *encoding* it. Callers
//! append commands at any time during the pass's lifetime; nothing touches the
//! command buffer until [`BlitPass::encode_commands`] replays the whole sequence,
//! in append order, against one encoder session.
//!
//! The pass refers to its command buffer through a [`Weak`] handle: the buffer
//! owns the pass, and a strong back-reference would form a cycle.

use crate::math::{IPoint, IRect};
use crate::renderer::api::command::{
    BlitCommand, CopyBufferToTextureCommand, CopyTextureToBufferCommand,
    CopyTextureToTextureCommand, GenerateMipmapCommand,
};
use crate::renderer::api::{BlitSettings, BufferView, DeviceBuffer, Texture};
use crate::renderer::error::{BlitPassError, ResourceError};
use crate::renderer::traits::{BlitEncoder, CommandBuffer};
use std::sync::{Arc, Weak};

/// Records blit commands and encodes them as a single unit.
///
/// A pass is single-use: the first call to [`encode_commands`](Self::encode_commands)
/// spends it, and later calls fail with [`BlitPassError::InvalidPass`] instead of
/// replaying the commands a second time.
#[derive(Debug)]
pub struct BlitPass {
    command_buffer: Weak<dyn CommandBuffer>,
    commands: Vec<BlitCommand>,
    label: Option<String>,
    settings: BlitSettings,
    spent: bool,
}

fn normalize_label(label: Option<&str>) -> Option<String> {
    label.filter(|l| !l.is_empty()).map(str::to_owned)
}

impl BlitPass {
    /// Creates an empty pass bound to `command_buffer` with default settings.
    pub fn new(command_buffer: Weak<dyn CommandBuffer>) -> Self {
        Self::with_settings(command_buffer, BlitSettings::default())
    }

    /// Creates an empty pass bound to `command_buffer`.
    pub fn with_settings(command_buffer: Weak<dyn CommandBuffer>, settings: BlitSettings) -> Self {
        Self {
            command_buffer,
            commands: Vec::new(),
            label: None,
            settings,
            spent: false,
        }
    }

    /// Creates an empty pass holding a weak reference to `command_buffer`.
    pub fn for_command_buffer<C: CommandBuffer + 'static>(command_buffer: &Arc<C>) -> Self {
        let weak: Weak<C> = Arc::downgrade(command_buffer);
        Self::new(weak)
    }

    /// Sets the debug label of the pass.
    ///
    /// An empty label is ignored and the previous label is kept.
    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if label.is_empty() {
            return;
        }
        self.label = Some(label);
    }

    /// The debug label of the pass, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The settings the pass was created with.
    pub fn settings(&self) -> &BlitSettings {
        &self.settings
    }

    /// The recorded commands, in append order.
    pub fn commands(&self) -> &[BlitCommand] {
        &self.commands
    }

    /// The number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` when no command has been recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Reports whether the pass can still be encoded.
    ///
    /// A fresh pass is always valid; a pass stops being valid once it has been encoded.
    pub fn is_valid(&self) -> bool {
        !self.spent
    }

    /// Queues a texture-to-texture copy.
    pub fn add_copy_texture_to_texture(
        &mut self,
        source: Arc<dyn Texture>,
        destination: Arc<dyn Texture>,
        source_region: IRect,
        destination_origin: IPoint,
        label: Option<&str>,
    ) -> Result<(), BlitPassError> {
        let mut command = CopyTextureToTextureCommand {
            source,
            destination,
            source_region,
            destination_origin,
            label: normalize_label(label),
        };
        if self.settings.validate_on_record {
            command
                .validate()
                .map_err(|reason| Self::rejected(CopyTextureToTextureCommand::NAME, reason))?;
        }
        self.push(BlitCommand::CopyTextureToTexture(command));
        Ok(())
    }

    /// Queues a read-back of a texture region into a buffer.
    pub fn add_copy_texture_to_buffer(
        &mut self,
        source: Arc<dyn Texture>,
        destination: Arc<dyn DeviceBuffer>,
        source_region: IRect,
        destination_offset: u64,
        label: Option<&str>,
    ) -> Result<(), BlitPassError> {
        let mut command = CopyTextureToBufferCommand {
            source,
            destination,
            source_region,
            destination_offset,
            label: normalize_label(label),
        };
        if self.settings.validate_on_record {
            command
                .validate()
                .map_err(|reason| Self::rejected(CopyTextureToBufferCommand::NAME, reason))?;
        }
        self.push(BlitCommand::CopyTextureToBuffer(command));
        Ok(())
    }

    /// Queues an upload of buffer bytes into one array slice of a texture.
    pub fn add_copy_buffer_to_texture(
        &mut self,
        source: BufferView,
        destination: Arc<dyn Texture>,
        destination_region: IRect,
        label: Option<&str>,
        slice: u32,
    ) -> Result<(), BlitPassError> {
        let mut command = CopyBufferToTextureCommand {
            source,
            destination,
            destination_region,
            label: normalize_label(label),
            slice,
        };
        if self.settings.validate_on_record {
            command
                .validate()
                .map_err(|reason| Self::rejected(CopyBufferToTextureCommand::NAME, reason))?;
        }
        self.push(BlitCommand::CopyBufferToTexture(command));
        Ok(())
    }

    /// Queues generation of the full mip chain of `texture`.
    pub fn add_generate_mipmap(
        &mut self,
        texture: Arc<dyn Texture>,
        label: Option<&str>,
    ) -> Result<(), BlitPassError> {
        let mut command = GenerateMipmapCommand {
            texture,
            label: normalize_label(label),
        };
        if self.settings.validate_on_record {
            command
                .validate()
                .map_err(|reason| Self::rejected(GenerateMipmapCommand::NAME, reason))?;
        }
        self.push(BlitCommand::GenerateMipmap(command));
        Ok(())
    }

    /// Encodes every recorded command, in append order, into the command buffer.
    ///
    /// Stops at the first command that fails. Commands encoded before the
    /// failure are not rolled back; the caller is expected to discard the
    /// whole command buffer. The pass is spent after this call whatever the
    /// outcome.
    pub fn encode_commands(&mut self) -> Result<(), BlitPassError> {
        if !self.is_valid() {
            log::warn!(
                "BlitPass {:?}: refusing to encode a pass that was already encoded.",
                self.label
            );
            return Err(BlitPassError::InvalidPass);
        }
        self.spent = true;

        let command_buffer = self
            .command_buffer
            .upgrade()
            .ok_or(BlitPassError::CommandBufferExpired)?;
        let mut encoder = command_buffer
            .encoder()
            .ok_or(BlitPassError::EncoderUnavailable)?;

        log::debug!(
            "BlitPass {:?}: encoding {} command(s) into command buffer {:?}.",
            self.label,
            self.commands.len(),
            command_buffer.label()
        );

        let debug_group = self
            .label
            .as_deref()
            .filter(|_| self.settings.debug_groups);
        if let Some(group) = debug_group {
            encoder.push_debug_group(group);
        }

        let result = self.encode_all(encoder.as_mut());

        if debug_group.is_some() {
            encoder.pop_debug_group();
        }

        if result.is_ok() {
            log::debug!(
                "BlitPass {:?}: encoded {} command(s).",
                self.label,
                self.commands.len()
            );
        }
        result
    }

    fn encode_all(&self, encoder: &mut dyn BlitEncoder) -> Result<(), BlitPassError> {
        for (index, command) in self.commands.iter().enumerate() {
            if self.settings.trace_commands {
                log::trace!(
                    "BlitPass {:?}: encoding #{index} {} ({:?}).",
                    self.label,
                    command.name(),
                    command.label()
                );
            }

            if let Err(source) = command.encode(encoder) {
                log::error!(
                    "BlitPass {:?}: {} command #{index} ({:?}) failed to encode: {source}",
                    self.label,
                    command.name(),
                    command.label()
                );
                return Err(BlitPassError::CommandEncodeFailed {
                    index,
                    label: command.label().map(str::to_owned),
                    source,
                });
            }
        }
        Ok(())
    }

    fn push(&mut self, command: BlitCommand) {
        if self.spent {
            log::warn!(
                "BlitPass {:?}: {} appended after encoding; it will never be encoded.",
                self.label,
                command.name()
            );
        }
        self.commands.push(command);
    }

    fn rejected(kind: &'static str, reason: ResourceError) -> BlitPassError {
        log::warn!("BlitPass: rejected {kind} command: {reason}");
        BlitPassError::InvalidCommand { kind, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unrecordable;

    impl CommandBuffer for Unrecordable {
        fn encoder(&self) -> Option<Box<dyn BlitEncoder + '_>> {
            None
        }
    }

    #[test]
    fn fresh_pass_is_empty_and_valid() {
        let buffer = Arc::new(Unrecordable);
        let pass = BlitPass::for_command_buffer(&buffer);
        assert!(pass.is_empty());
        assert_eq!(pass.len(), 0);
        assert!(pass.is_valid());
        assert!(pass.label().is_none());
    }

    #[test]
    fn empty_label_keeps_previous_label() {
        let buffer = Arc::new(Unrecordable);
        let mut pass = BlitPass::for_command_buffer(&buffer);

        pass.set_label("");
        assert!(pass.label().is_none());

        pass.set_label("Upload");
        pass.set_label("");
        assert_eq!(pass.label(), Some("Upload"));

        pass.set_label("Readback");
        assert_eq!(pass.label(), Some("Readback"));
    }

    #[test]
    fn missing_encoder_is_reported() {
        let buffer = Arc::new(Unrecordable);
        let mut pass = BlitPass::for_command_buffer(&buffer);
        assert_eq!(pass.encode_commands(), Err(BlitPassError::EncoderUnavailable));
    }

    #[test]
    fn dropped_command_buffer_is_reported() {
        let buffer = Arc::new(Unrecordable);
        let mut pass = BlitPass::for_command_buffer(&buffer);
        drop(buffer);
        assert_eq!(
            pass.encode_commands(),
            Err(BlitPassError::CommandBufferExpired)
        );
    }

    #[test]
    fn pass_is_spent_after_any_encode_attempt() {
        let buffer = Arc::new(Unrecordable);
        let mut pass = BlitPass::for_command_buffer(&buffer);
        assert!(pass.encode_commands().is_err());
        assert!(!pass.is_valid());
        assert_eq!(pass.encode_commands(), Err(BlitPassError::InvalidPass));
    }

    #[test]
    fn label_normalization() {
        assert_eq!(normalize_label(Some("")), None);
        assert_eq!(normalize_label(None), None);
        assert_eq!(normalize_label(Some("Copy")), Some("Copy".to_string()));
    }
}
