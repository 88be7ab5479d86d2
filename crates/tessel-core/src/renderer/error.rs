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

//! Defines the hierarchy of error types for blit recording and encoding.

use crate::renderer::api::texture::TextureFormat;
use std::fmt;

/// An error related to the use of a GPU resource in a transfer operation.
///
/// Encoders return it when a native call cannot be issued, and record-time
/// validation returns it when a command is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A resource could not be found.
    NotFound,
    /// The resource does not belong to the backend it is used with.
    InvalidHandle,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// The operation would access a resource out of its bounds.
    OutOfBounds,
    /// The copy region covers no texel.
    EmptyRegion,
    /// The requested array slice does not exist on the texture.
    InvalidSlice {
        /// The requested slice.
        slice: u32,
        /// The number of array layers the texture has.
        layer_count: u32,
    },
    /// The texture has no mip chain to generate.
    InvalidMipChain {
        /// The mip level count of the texture.
        mip_level_count: u32,
    },
    /// A resource lacks the usage flag the operation requires.
    MissingUsage {
        /// Which resource of the operation lacks the usage.
        resource: &'static str,
        /// The name of the missing usage flag.
        usage: &'static str,
    },
    /// Source and destination texel formats differ.
    FormatMismatch {
        /// The source texture format.
        source_format: TextureFormat,
        /// The destination texture format.
        destination_format: TextureFormat,
    },
    /// Source and destination sample counts differ.
    SampleCountMismatch {
        /// The source texture sample count.
        source_count: u32,
        /// The destination texture sample count.
        destination_count: u32,
    },
    /// The texel format cannot be used for the operation.
    UnsupportedFormat(String),
    /// Source and destination of a copy are the same texture subresource.
    OverlappingCopy,
    /// A buffer row pitch does not satisfy the backend's copy alignment.
    UnalignedCopy {
        /// The row pitch of the copy in bytes.
        bytes_per_row: u32,
        /// The required alignment in bytes.
        alignment: u32,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound => write!(f, "Resource not found."),
            ResourceError::InvalidHandle => {
                write!(f, "Resource handle does not belong to this backend.")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::EmptyRegion => write!(f, "Copy region is empty."),
            ResourceError::InvalidSlice { slice, layer_count } => write!(
                f,
                "Array slice {slice} is not addressable on a texture with {layer_count} layer(s)."
            ),
            ResourceError::InvalidMipChain { mip_level_count } => write!(
                f,
                "Cannot generate mipmaps for a texture with {mip_level_count} mip level(s)."
            ),
            ResourceError::MissingUsage { resource, usage } => {
                write!(f, "The {resource} is missing the {usage} usage.")
            }
            ResourceError::FormatMismatch {
                source_format,
                destination_format,
            } => write!(
                f,
                "Source format {source_format:?} does not match destination format {destination_format:?}."
            ),
            ResourceError::SampleCountMismatch {
                source_count,
                destination_count,
            } => write!(
                f,
                "Source sample count {source_count} does not match destination sample count {destination_count}."
            ),
            ResourceError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {msg}"),
            ResourceError::OverlappingCopy => {
                write!(f, "Source and destination are the same texture subresource.")
            }
            ResourceError::UnalignedCopy {
                bytes_per_row,
                alignment,
            } => write!(
                f,
                "Row pitch of {bytes_per_row} bytes is not a multiple of {alignment}."
            ),
        }
    }
}

impl std::error::Error for ResourceError {}

/// An error produced while recording into or encoding a [`BlitPass`](crate::renderer::BlitPass).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlitPassError {
    /// The pass failed its own validity check, e.g. because it was already encoded.
    InvalidPass,
    /// The command buffer the pass was created for no longer exists.
    CommandBufferExpired,
    /// The command buffer exists but cannot currently supply an encoder.
    EncoderUnavailable,
    /// A queued command failed to encode. Commands before it may already be
    /// recorded in the command buffer.
    CommandEncodeFailed {
        /// The zero-based position of the command in the pass.
        index: usize,
        /// The label of the command, if any.
        label: Option<String>,
        /// The encoder error.
        source: ResourceError,
    },
    /// Record-time validation rejected a command; nothing was appended.
    InvalidCommand {
        /// The kind of command that was rejected.
        kind: &'static str,
        /// Why it was rejected.
        reason: ResourceError,
    },
}

impl fmt::Display for BlitPassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlitPassError::InvalidPass => write!(f, "The blit pass is not in an encodable state."),
            BlitPassError::CommandBufferExpired => {
                write!(f, "The command buffer of the blit pass no longer exists.")
            }
            BlitPassError::EncoderUnavailable => {
                write!(f, "The command buffer could not supply an encoder.")
            }
            BlitPassError::CommandEncodeFailed {
                index,
                label,
                source,
            } => write!(
                f,
                "Blit command #{index} ('{}') failed to encode: {source}",
                label.as_deref().unwrap_or("unlabeled")
            ),
            BlitPassError::InvalidCommand { kind, reason } => {
                write!(f, "Rejected {kind} command: {reason}")
            }
        }
    }
}

impl std::error::Error for BlitPassError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlitPassError::CommandEncodeFailed { source, .. } => Some(source),
            BlitPassError::InvalidCommand { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn resource_error_display() {
        let err = ResourceError::InvalidSlice {
            slice: 2,
            layer_count: 1,
        };
        assert_eq!(
            format!("{err}"),
            "Array slice 2 is not addressable on a texture with 1 layer(s)."
        );

        let err = ResourceError::MissingUsage {
            resource: "source texture",
            usage: "COPY_SRC",
        };
        assert_eq!(
            format!("{err}"),
            "The source texture is missing the COPY_SRC usage."
        );
    }

    #[test]
    fn encode_failure_names_the_command() {
        let err = BlitPassError::CommandEncodeFailed {
            index: 3,
            label: Some("Upload atlas".to_string()),
            source: ResourceError::OutOfBounds,
        };
        assert_eq!(
            format!("{err}"),
            "Blit command #3 ('Upload atlas') failed to encode: Resource access out of bounds."
        );
        assert!(err.source().is_some());

        let unlabeled = BlitPassError::CommandEncodeFailed {
            index: 0,
            label: None,
            source: ResourceError::NotFound,
        };
        assert!(format!("{unlabeled}").contains("'unlabeled'"));
    }

    #[test]
    fn pass_level_errors_have_no_source() {
        assert!(BlitPassError::InvalidPass.source().is_none());
        assert!(BlitPassError::CommandBufferExpired.source().is_none());
        assert!(BlitPassError::EncoderUnavailable.source().is_none());
    }
}
