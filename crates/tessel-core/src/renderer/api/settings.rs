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

//! Settings controlling how blit passes record and encode.

use serde::{Deserialize, Serialize};

/// A collection of settings that affect blit recording and encoding.
///
/// Missing fields fall back to [`BlitSettings::default`] when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlitSettings {
    /// If `true`, append operations check their arguments and clip copy regions
    /// before queueing, rejecting commands that could never encode.
    pub validate_on_record: bool,
    /// If `true`, a labelled pass wraps its commands in an encoder debug group.
    pub debug_groups: bool,
    /// If `true`, every encoded command is logged at `trace` level.
    pub trace_commands: bool,
}

impl Default for BlitSettings {
    fn default() -> Self {
        Self {
            validate_on_record: false,
            debug_groups: true,
            trace_commands: false,
        }
    }
}

impl BlitSettings {
    /// Parses settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
