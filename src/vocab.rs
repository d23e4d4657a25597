//! Recognized-class vocabulary.
//!
//! The classifier emits opaque class codes (`"20ar"`, `"500ba"` …); the
//! vocabulary maps them to the denomination string that is spoken and shown.
//! This is deployment configuration, not core logic — different model
//! revisions ship different class lists, and swapping the vocabulary file
//! retargets the same engine.
//!
//! Persisted as JSON in the platform config directory:
//!
//! | Platform | Path |
//! |----------|------|
//! | Windows  | `%APPDATA%\cashlens\vocabulary.json` |
//! | macOS    | `~/Library/Application Support/cashlens/vocabulary.json` |
//! | Linux    | `~/.config/cashlens/vocabulary.json` |

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::AppPaths;

/// Display value used when nothing is recognized (idle UI state).
pub const IDLE_DISPLAY: &str = "0";

// ---------------------------------------------------------------------------
// VocabEntry
// ---------------------------------------------------------------------------

/// One class-to-denomination mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    /// Classifier class code.
    pub class: String,
    /// Spoken/displayed denomination.
    pub spoken: String,
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Ordered class list with a pure lookup.
///
/// ```rust
/// use cashlens::vocab::Vocabulary;
///
/// let vocab = Vocabulary::default();
/// assert_eq!(vocab.spoken("20ar"), Some("20 pesos"));
/// assert_eq!(vocab.spoken("not-a-class"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    entries: Vec<VocabEntry>,
}

impl Default for Vocabulary {
    /// The reference deployment: eight Mexican-peso classes (front/back,
    /// two print series each for 20 and 50, one pair for 500).
    fn default() -> Self {
        let entry = |class: &str, spoken: &str| VocabEntry {
            class: class.into(),
            spoken: spoken.into(),
        };
        Self {
            entries: vec![
                entry("20ar", "20 pesos"),
                entry("20aa", "20 pesos"),
                entry("20br", "20 pesos"),
                entry("20ba", "20 pesos"),
                entry("50br", "50 pesos"),
                entry("50ba", "50 pesos"),
                entry("500ba", "500 pesos"),
                entry("500br", "500 pesos"),
            ],
        }
    }
}

impl Vocabulary {
    /// Build a vocabulary from explicit entries.
    pub fn new(entries: Vec<VocabEntry>) -> Self {
        Self { entries }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load from the platform config directory; a missing file yields the
    /// reference default so a fresh install announces something sensible.
    pub fn load_or_default() -> Self {
        Self::load_from(&AppPaths::new().vocab_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let data = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("vocab: malformed {}: {e}; using defaults", path.display());
            Self::default()
        })
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Pure lookup of the spoken denomination for a class code.
    pub fn spoken(&self, class: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.class == class)
            .map(|e| e.spoken.as_str())
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the vocabulary has no classes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_maps_all_reference_classes() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.len(), 8);

        for class in ["20ar", "20aa", "20br", "20ba"] {
            assert_eq!(vocab.spoken(class), Some("20 pesos"));
        }
        for class in ["50br", "50ba"] {
            assert_eq!(vocab.spoken(class), Some("50 pesos"));
        }
        for class in ["500ba", "500br"] {
            assert_eq!(vocab.spoken(class), Some("500 pesos"));
        }
    }

    #[test]
    fn unknown_class_returns_none() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.spoken("1000br"), None);
        assert_eq!(vocab.spoken(""), None);
    }

    #[test]
    fn json_round_trip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("vocabulary.json");

        let original = Vocabulary::default();
        original.save_to(&path).expect("save");

        let loaded = Vocabulary::load_from(&path);
        assert_eq!(original, loaded);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let loaded = Vocabulary::load_from(&dir.path().join("missing.json"));
        assert_eq!(loaded, Vocabulary::default());
    }

    #[test]
    fn load_malformed_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("vocabulary.json");
        std::fs::write(&path, "[[[").expect("write");
        assert_eq!(Vocabulary::load_from(&path), Vocabulary::default());
    }
}
