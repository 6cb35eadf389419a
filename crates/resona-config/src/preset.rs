//! Reverb preset file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use resona_core::{AudioGraph, GraphError};
use resona_effects::params::{
    DECAY_DEFAULT, DECAY_MAX, DECAY_MIN, REVERSE_DEFAULT, SECONDS_DEFAULT, SECONDS_MAX,
    SECONDS_MIN,
};
use resona_effects::{ReverbParams, ReverbSynthesizer};

use crate::error::ConfigError;

/// A named set of reverb parameters stored as TOML.
///
/// Missing fields take the reverb defaults, so a file holding only a name is
/// a valid preset.
///
/// # TOML Format
///
/// ```toml
/// name = "Hall"
/// description = "Long, smooth concert hall"
/// sample_rate = 48000
/// seconds = 4.5
/// decay = 2.5
/// reverse = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReverbPreset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate the preset was tuned at (defaults to 48000).
    /// Informational only; synthesis always uses the host rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Tail length in seconds.
    #[serde(default = "default_seconds")]
    pub seconds: f32,

    /// Envelope exponent.
    #[serde(default = "default_decay")]
    pub decay: f32,

    /// Swell instead of decay.
    #[serde(default = "default_reverse")]
    pub reverse: bool,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_seconds() -> f32 {
    SECONDS_DEFAULT
}

fn default_decay() -> f32 {
    DECAY_DEFAULT
}

fn default_reverse() -> bool {
    REVERSE_DEFAULT
}

impl ReverbPreset {
    /// Create a preset with default parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            seconds: SECONDS_DEFAULT,
            decay: DECAY_DEFAULT,
            reverse: REVERSE_DEFAULT,
        }
    }

    /// Capture a parameter set under a name.
    pub fn from_params(name: impl Into<String>, params: ReverbParams) -> Self {
        Self {
            seconds: params.seconds(),
            decay: params.decay(),
            reverse: params.reverse(),
            ..Self::new(name)
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the tail length as stored (not clamped).
    pub fn with_seconds(mut self, seconds: f32) -> Self {
        self.seconds = seconds;
        self
    }

    /// Set the envelope exponent as stored (not clamped).
    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay;
        self
    }

    /// Set the direction.
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset: ReverbPreset = toml::from_str(&content)?;
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The stored values as reverb parameters, clamped into range.
    pub fn params(&self) -> ReverbParams {
        ReverbParams::new(self.seconds, self.decay, self.reverse)
    }

    /// Strict check: reports values that [`params`](Self::params) would have
    /// to clamp.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(&self.name, "seconds", self.seconds, SECONDS_MIN, SECONDS_MAX)?;
        check_range(&self.name, "decay", self.decay, DECAY_MIN, DECAY_MAX)?;
        if self.sample_rate == 0 {
            return Err(ConfigError::invalid_parameter(
                &self.name,
                "sample_rate",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Builds a reverb in `graph` from this preset.
    pub fn build(&self, graph: &mut dyn AudioGraph) -> Result<ReverbSynthesizer, GraphError> {
        ReverbSynthesizer::new(graph, self.seconds, self.decay, self.reverse)
    }

    /// Applies this preset to an existing reverb, resynthesizing once.
    pub fn apply(
        &self,
        reverb: &mut ReverbSynthesizer,
        graph: &mut dyn AudioGraph,
    ) -> Result<(), GraphError> {
        reverb.reconfigure(graph, self.params()).map(|_| ())
    }
}

fn check_range(
    preset: &str,
    param: &str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::invalid_parameter(
            preset,
            param,
            "must be a finite number",
        ));
    }
    if value < min || value > max {
        return Err(ConfigError::invalid_parameter(
            preset,
            param,
            format!("{value} is outside [{min}, {max}]"),
        ));
    }
    Ok(())
}

impl Default for ReverbPreset {
    fn default() -> Self {
        Self::new("Default")
    }
}
