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

//! Runtime configuration of the forward technique.
//!
//! Settings are plain serde data so they can live in a RON file next to the
//! rest of the engine configuration:
//!
//! ```ron
//! (
//!     max_lights_per_pass: 4,
//!     instancing_enabled: false,
//! )
//! ```
//!
//! Missing fields take their default value.

use lumen_core::math::Mat4;
use lumen_core::renderer::api::BillboardVertex;
use serde::{Deserialize, Serialize};
use std::mem::size_of;
use std::path::Path;

/// Upper bound of light slots a forward shader can expose per pass.
pub const MAX_LIGHTS_PER_PASS_LIMIT: usize = 16;

/// Largest quad count addressable by the 16-bit quad index buffer.
pub const DEFAULT_MAX_QUADS: usize = u16::MAX as usize / 6;

/// Errors raised while loading or validating [`ForwardSettings`].
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// A field is outside its accepted range
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Configuration of a [`ForwardRenderTechnique`](super::ForwardRenderTechnique).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardSettings {
    /// Light slots filled per draw pass.
    pub max_lights_per_pass: usize,
    /// Optional upper bound on the number of passes drawn for one object.
    ///
    /// `None` draws as many passes as the object's lights need.
    pub max_light_passes_per_object: Option<usize>,
    /// Whether instanced submission may be used at all.
    pub instancing_enabled: bool,
    /// A batch is instanced only when its largest instance count exceeds this value.
    pub min_instances_for_instancing: usize,
    /// Size in bytes of the streaming vertex buffer used for sprites and billboards.
    pub streaming_buffer_size: u64,
    /// Size in bytes of the per-instance data buffer.
    pub instance_buffer_size: u64,
    /// Largest number of quads drawn from the streaming buffer at once.
    pub max_quads: usize,
}

impl Default for ForwardSettings {
    fn default() -> Self {
        Self {
            max_lights_per_pass: 3,
            max_light_passes_per_object: None,
            instancing_enabled: true,
            min_instances_for_instancing: 10,
            streaming_buffer_size: 4 * 1024 * 1024,
            instance_buffer_size: 1024 * 1024,
            max_quads: DEFAULT_MAX_QUADS,
        }
    }
}

impl ForwardSettings {
    /// Parses settings from a RON string and validates them.
    pub fn from_ron_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            ron::from_str(source).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a RON file and validates them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Serializes the settings to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    /// Checks that every field is usable by the technique.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=MAX_LIGHTS_PER_PASS_LIMIT).contains(&self.max_lights_per_pass) {
            return Err(SettingsError::Invalid {
                field: "max_lights_per_pass",
                reason: format!(
                    "{} is not in 1..={}",
                    self.max_lights_per_pass, MAX_LIGHTS_PER_PASS_LIMIT
                ),
            });
        }
        if self.max_light_passes_per_object == Some(0) {
            return Err(SettingsError::Invalid {
                field: "max_light_passes_per_object",
                reason: "at least one pass is required".to_string(),
            });
        }
        if !(1..=DEFAULT_MAX_QUADS).contains(&self.max_quads) {
            return Err(SettingsError::Invalid {
                field: "max_quads",
                reason: format!(
                    "{} is not in 1..={} (16-bit quad indices)",
                    self.max_quads, DEFAULT_MAX_QUADS
                ),
            });
        }
        let min_streaming = 4 * size_of::<BillboardVertex>() as u64;
        if self.streaming_buffer_size < min_streaming {
            return Err(SettingsError::Invalid {
                field: "streaming_buffer_size",
                reason: format!("must hold at least one quad ({min_streaming} bytes)"),
            });
        }
        let min_instance = size_of::<Mat4>() as u64;
        if self.instance_buffer_size < min_instance {
            return Err(SettingsError::Invalid {
                field: "instance_buffer_size",
                reason: format!("must hold at least one matrix ({min_instance} bytes)"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ForwardSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_lights_per_pass, 3);
        assert_eq!(settings.max_quads, 10922);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let settings =
            ForwardSettings::from_ron_str("(max_lights_per_pass: 4, instancing_enabled: false)")
                .unwrap();
        assert_eq!(settings.max_lights_per_pass, 4);
        assert!(!settings.instancing_enabled);
        assert_eq!(settings.min_instances_for_instancing, 10);
    }

    #[test]
    fn test_ron_round_trip() {
        let settings = ForwardSettings {
            max_light_passes_per_object: Some(5),
            ..Default::default()
        };
        let text = settings.to_ron_string().unwrap();
        assert_eq!(ForwardSettings::from_ron_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let err = ForwardSettings::from_ron_str("(max_lights_per_pass: 0)").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "max_lights_per_pass",
                ..
            }
        ));

        let settings = ForwardSettings {
            max_quads: DEFAULT_MAX_QUADS + 1,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = ForwardSettings {
            instance_buffer_size: 8,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = ForwardSettings::from_ron_str("(max_lights_per_pass: \"three\")").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ForwardSettings::load("/definitely/not/here/forward.ron").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
