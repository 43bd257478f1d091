//! Utility functions

use std::path::PathBuf;

/// Get the app data directory (settings, catalog database, logs)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Photo Picker")
}

/// Default pictures directory offered when no library root is configured
pub fn default_library_root() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Pluralizing count label, e.g. "3 albums" / "1 album"
pub fn format_count(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
