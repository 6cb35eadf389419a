//! Platform-specific paths for user presets.
//!
//! - Linux: `~/.config/resona/presets/`
//! - macOS: `~/Library/Application Support/resona/presets/`
//! - Windows: `%APPDATA%\resona\presets\`

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "resona";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// Returns the user-specific presets directory.
///
/// Falls back to `./resona/presets` if the config directory cannot be
/// determined.
pub fn user_presets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PRESETS_SUBDIR)
}

/// Ensure the user presets directory exists, creating it if needed.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_presets_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Finds a preset file by path or by name inside `dir`.
///
/// `name` may be a path to an existing file, or a preset name with or
/// without the `.toml` extension.
pub fn find_preset_file_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Finds a preset file by path or by name in the user presets directory.
pub fn find_preset_file(name: &str) -> Option<PathBuf> {
    find_preset_file_in(&user_presets_dir(), name)
}

/// Lists `.toml` files in `dir`, sorted. Missing or unreadable directories
/// yield an empty list.
pub fn list_presets_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Lists preset files in the user presets directory.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in(&user_presets_dir())
}

/// The preset name for a file: its stem.
///
/// ```rust
/// use resona_config::paths::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/presets/dark_hall.toml"));
/// assert_eq!(name.as_deref(), Some("dark_hall"));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
