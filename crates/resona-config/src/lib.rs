//! Preset storage for resona reverbs.
//!
//! Presets are small TOML files naming a tail length, an envelope exponent and
//! a direction. This crate loads and saves them, ships a set of factory
//! presets, and turns a preset into a live [`ReverbSynthesizer`] on any
//! [`AudioGraph`] host.
//!
//! # Example
//!
//! ```rust
//! use resona_config::{ReverbPreset, find_preset};
//! use resona_core::ProcessingGraph;
//!
//! let mut graph = ProcessingGraph::new(8000.0, 256);
//! let preset = find_preset("hall").unwrap();
//! let mut reverb = preset.build(&mut graph).unwrap();
//! assert_eq!(reverb.seconds(), 4.5);
//!
//! let custom = ReverbPreset::new("Custom").with_seconds(2.0).with_reverse(true);
//! custom.apply(&mut reverb, &mut graph).unwrap();
//! assert!(reverb.reverse());
//! # reverb.destroy(&mut graph);
//! ```
//!
//! [`ReverbSynthesizer`]: resona_effects::ReverbSynthesizer
//! [`AudioGraph`]: resona_core::AudioGraph

mod error;
mod preset;

pub mod factory_presets;
pub mod paths;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_presets, get_factory_preset, is_factory_preset,
};
pub use paths::{
    ensure_user_presets_dir, find_preset_file, list_user_presets, user_presets_dir,
};
pub use preset::ReverbPreset;

/// Resolves a preset by name.
///
/// Factory presets win; otherwise `name` is looked up as a file path or as a
/// file in the user presets directory.
pub fn find_preset(name: &str) -> Result<ReverbPreset, ConfigError> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }
    match find_preset_file(name) {
        Some(path) => ReverbPreset::load(path),
        None => Err(ConfigError::PresetNotFound(name.to_string())),
    }
}
