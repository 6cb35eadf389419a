//! Factory presets bundled with the library.
//!
//! These presets are embedded at compile time and always available without
//! external files. They span the useful range of the reverb, from a short
//! room to a near-static wash.

use crate::ReverbPreset;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "default",
    "small_room",
    "hall",
    "cathedral",
    "reverse_swell",
    "infinite_wash",
];

static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PRESET),
    ("small_room", SMALL_ROOM_PRESET),
    ("hall", HALL_PRESET),
    ("cathedral", CATHEDRAL_PRESET),
    ("reverse_swell", REVERSE_SWELL_PRESET),
    ("infinite_wash", INFINITE_WASH_PRESET),
];

const DEFAULT_PRESET: &str = r#"
name = "Default"
description = "Three seconds, quadratic decay"
sample_rate = 48000
seconds = 3.0
decay = 2.0
reverse = false
"#;

const SMALL_ROOM_PRESET: &str = r#"
name = "Small Room"
description = "Short, steep tail for tight spaces"
sample_rate = 48000
seconds = 1.2
decay = 6.0
reverse = false
"#;

const HALL_PRESET: &str = r#"
name = "Hall"
description = "Long, smooth concert hall"
sample_rate = 48000
seconds = 4.5
decay = 2.5
reverse = false
"#;

const CATHEDRAL_PRESET: &str = r#"
name = "Cathedral"
description = "Very long tail that lingers"
sample_rate = 48000
seconds = 9.0
decay = 1.5
reverse = false
"#;

const REVERSE_SWELL_PRESET: &str = r#"
name = "Reverse Swell"
description = "Tail rises into the dry signal"
sample_rate = 48000
seconds = 2.5
decay = 3.0
reverse = true
"#;

const INFINITE_WASH_PRESET: &str = r#"
name = "Infinite Wash"
description = "Twenty seconds of slowly fading noise"
sample_rate = 48000
seconds = 20.0
decay = 0.5
reverse = false
"#;

/// All factory presets, in [`FACTORY_PRESET_NAMES`] order.
pub fn factory_presets() -> Vec<ReverbPreset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| ReverbPreset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by identifier or display name, ignoring case.
///
/// ```rust
/// use resona_config::get_factory_preset;
///
/// let hall = get_factory_preset("hall").unwrap();
/// assert_eq!(hall.name, "Hall");
/// assert!(get_factory_preset("Reverse Swell").unwrap().reverse);
/// assert!(get_factory_preset("garage").is_none());
/// ```
pub fn get_factory_preset(name: &str) -> Option<ReverbPreset> {
    for (id, toml) in FACTORY_PRESETS_TOML {
        if id.eq_ignore_ascii_case(name) {
            return ReverbPreset::from_toml(toml).ok();
        }
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

/// Check if a name refers to a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}
