//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! Thresholds, dwell times and the reset interval are configuration, never
//! constants in the engine: earlier revisions of this application hard-coded
//! slightly different values in each deployment, and one engine now serves
//! them all.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// LabelSwitchPolicy
// ---------------------------------------------------------------------------

/// What the stabilizer does when a high-confidence frame carries a
/// *different* label than the current pending candidate.
///
/// | Variant  | Behaviour                                                 |
/// |----------|-----------------------------------------------------------|
/// | Continue | The dwell window keeps running; the label that eventually |
/// |          | settles is whatever the confirming frame carried.         |
/// | Restart  | The dwell window restarts from the new frame, so a label  |
/// |          | must be observed continuously for the full dwell time.    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSwitchPolicy {
    /// Any high-confidence frame extends the same dwell window.
    Continue,
    /// A label change restarts the dwell window for the new label.
    Restart,
}

impl Default for LabelSwitchPolicy {
    fn default() -> Self {
        // Restart is the safe choice: a denomination is only announced after
        // it has been seen continuously for the full dwell duration.
        Self::Restart
    }
}

// ---------------------------------------------------------------------------
// RecognitionConfig
// ---------------------------------------------------------------------------

/// Settings for the recognition-stabilization engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Minimum classifier confidence (0.0 – 1.0) for a frame to count as a
    /// detection at all.
    pub confidence_threshold: f32,
    /// Milliseconds a candidate must stay above threshold before it settles
    /// and is announced.
    pub dwell_ms: u64,
    /// Milliseconds after settling before the result decays back to idle.
    pub reset_ms: u64,
    /// Behaviour when the candidate label changes mid-dwell.
    pub label_switch: LabelSwitchPolicy,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.99,
            dwell_ms: 2_000,
            reset_ms: 30_000,
            label_switch: LabelSwitchPolicy::default(),
        }
    }
}

impl RecognitionConfig {
    /// Dwell duration as a [`Duration`].
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    /// Reset interval as a [`Duration`].
    pub fn reset_interval(&self) -> Duration {
        Duration::from_millis(self.reset_ms)
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the speech collaborator.
///
/// The core never synthesizes speech itself; the language tag is handed to
/// whatever [`SpeechSink`](crate::feedback::SpeechSink) implementation the
/// host wires in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// BCP-47 language tag for spoken announcements.
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "es-MX".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use cashlens::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Recognition-stabilization settings.
    pub recognition: RecognitionConfig,
    /// Speech collaborator settings.
    pub speech: SpeechConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(
            original.recognition.confidence_threshold,
            loaded.recognition.confidence_threshold
        );
        assert_eq!(original.recognition.dwell_ms, loaded.recognition.dwell_ms);
        assert_eq!(original.recognition.reset_ms, loaded.recognition.reset_ms);
        assert_eq!(
            original.recognition.label_switch,
            loaded.recognition.label_switch
        );
        assert_eq!(original.speech.language, loaded.speech.language);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(
            config.recognition.confidence_threshold,
            default.recognition.confidence_threshold
        );
        assert_eq!(config.recognition.dwell_ms, default.recognition.dwell_ms);
        assert_eq!(config.speech.language, default.speech.language);
    }

    /// Default values match the reference deployment.
    #[test]
    fn default_values_match_reference() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.recognition.confidence_threshold, 0.99);
        assert_eq!(cfg.recognition.dwell_ms, 2_000);
        assert_eq!(cfg.recognition.reset_ms, 30_000);
        assert_eq!(cfg.recognition.label_switch, LabelSwitchPolicy::Restart);
        assert_eq!(cfg.speech.language, "es-MX");
    }

    /// Modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.recognition.confidence_threshold = 0.9;
        cfg.recognition.dwell_ms = 1_500;
        cfg.recognition.reset_ms = 10_000;
        cfg.recognition.label_switch = LabelSwitchPolicy::Continue;
        cfg.speech.language = "en-US".into();

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.recognition.confidence_threshold, 0.9);
        assert_eq!(loaded.recognition.dwell_ms, 1_500);
        assert_eq!(loaded.recognition.reset_ms, 10_000);
        assert_eq!(loaded.recognition.label_switch, LabelSwitchPolicy::Continue);
        assert_eq!(loaded.speech.language, "en-US");
    }

    /// The duration helpers convert milliseconds faithfully.
    #[test]
    fn duration_helpers() {
        let cfg = RecognitionConfig::default();
        assert_eq!(cfg.dwell(), Duration::from_millis(2_000));
        assert_eq!(cfg.reset_interval(), Duration::from_millis(30_000));
    }
}
