//! User preference toggles and their persistence.
//!
//! [`PreferenceGate`] is the single source of truth for the two user toggles
//! (`sounds_enabled`, `flash_enabled`).  Reads are non-blocking snapshots;
//! writes update memory immediately and persist to `preferences.json` on a
//! detached thread, fire-and-forget — the persisted value is advisory UI
//! state, not used for correctness, so callers never await the write.
//!
//! The feedback coordinator reads a fresh snapshot at every phase transition;
//! the settings UI mutates concurrently.  Eventual visibility of the latest
//! write is all that is guaranteed or needed.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// The user toggles, both enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Whether scanning / recognized audio cues are audible.  Does **not**
    /// gate spoken announcements — voice feedback is accessibility-critical.
    pub sounds_enabled: bool,
    /// Whether the camera collaborator should run the flash as a torch.
    pub flash_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sounds_enabled: true,
            flash_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// PreferenceGate
// ---------------------------------------------------------------------------

/// Thread-safe handle to the preference store.
///
/// Cheap to clone (`Arc` clone); one clone lives in the feedback coordinator,
/// another in whatever settings UI the host provides.
///
/// ```rust
/// use cashlens::prefs::PreferenceGate;
///
/// let gate = PreferenceGate::in_memory();
/// assert!(gate.get().sounds_enabled);
///
/// gate.set_sounds_enabled(false);
/// assert!(!gate.get().sounds_enabled);
/// assert!(gate.get().flash_enabled);
/// ```
#[derive(Clone)]
pub struct PreferenceGate {
    inner: Arc<RwLock<Preferences>>,
    /// `None` disables persistence entirely (tests, ephemeral sessions).
    path: Option<Arc<PathBuf>>,
    /// One file writer at a time; a writer takes its snapshot only after
    /// holding this, so the last write always carries the latest state.
    write_lock: Arc<Mutex<()>>,
}

impl PreferenceGate {
    /// Load preferences from the platform config directory, or defaults when
    /// the file does not exist yet.
    pub fn load_or_default() -> Self {
        Self::load_from(AppPaths::new().preferences_file)
    }

    /// Load from an explicit path (useful for tests).
    ///
    /// An unreadable or malformed file falls back to defaults — a corrupt
    /// preference file must never prevent the application from starting.
    pub fn load_from(path: PathBuf) -> Self {
        let prefs = if path.exists() {
            let data = std::fs::read_to_string(&path).unwrap_or_default();
            serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("prefs: malformed {}: {e}; using defaults", path.display());
                Preferences::default()
            })
        } else {
            Preferences::default()
        };

        Self {
            inner: Arc::new(RwLock::new(prefs)),
            path: Some(Arc::new(path)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// A gate with no backing file.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Preferences::default())),
            path: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Snapshot read — always succeeds, never blocks beyond the lock.
    pub fn get(&self) -> Preferences {
        *self.inner.read().unwrap()
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Toggle audio cues.
    pub fn set_sounds_enabled(&self, enabled: bool) {
        self.update(|p| p.sounds_enabled = enabled);
    }

    /// Toggle the camera flash preference.
    pub fn set_flash_enabled(&self, enabled: bool) {
        self.update(|p| p.flash_enabled = enabled);
    }

    fn update(&self, mutate: impl FnOnce(&mut Preferences)) {
        {
            let mut guard = self.inner.write().unwrap();
            mutate(&mut guard);
        }

        // Write-through, fire-and-forget.  Failures are logged, never
        // surfaced — the in-memory value is already authoritative.  The
        // writer takes its snapshot under the write lock rather than
        // carrying one from here: two quick successive writes would
        // otherwise race on the file, and the older snapshot could land
        // last.
        if let Some(path) = &self.path {
            let inner = Arc::clone(&self.inner);
            let path = Arc::clone(path);
            let write_lock = Arc::clone(&self.write_lock);
            std::thread::spawn(move || {
                let _writer = write_lock.lock().unwrap();
                let snapshot = *inner.read().unwrap();
                if let Err(e) = persist(snapshot, &path) {
                    log::warn!("prefs: failed to persist {}: {e}", path.display());
                }
            });
        }
    }

    /// Synchronous persistence, used at orderly shutdown and in tests.
    pub fn persist_now(&self) -> Result<()> {
        match &self.path {
            Some(path) => {
                let _writer = self.write_lock.lock().unwrap();
                persist(self.get(), path)
            }
            None => Ok(()),
        }
    }
}

fn persist(prefs: Preferences, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(&prefs)?;
    std::fs::write(path, data)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
