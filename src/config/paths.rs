//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout (config dir — settings, preferences, vocabulary):
//!
//!   Windows: %APPDATA%\cashlens\
//!   macOS:   ~/Library/Application Support/cashlens/
//!   Linux:   ~/.config/cashlens/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for all persisted application files.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to `preferences.json` (user toggles, written by the
    /// settings UI through the preference gate).
    pub preferences_file: PathBuf,
    /// Full path to `vocabulary.json` (recognized-class vocabulary).
    pub vocab_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "cashlens";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let preferences_file = config_dir.join("preferences.json");
        let vocab_file = config_dir.join("vocabulary.json");

        Self {
            config_dir,
            settings_file,
            preferences_file,
            vocab_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
