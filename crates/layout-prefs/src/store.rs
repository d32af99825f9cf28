use serde_json::Value;
use tracing::{debug, trace};

use crate::{Preferences, Result, StorageBackend};

/// Namespace key of the current record format.
pub const DEFAULT_KEY: &str = "st_accordion_layout_v4";

/// Namespaced get/set/clear of the [`Preferences`] record.
pub struct PreferenceStore {
    /// Raw storage.
    backend: Box<dyn StorageBackend>,
    /// Versioned namespace key.
    key: String,
}

impl PreferenceStore {
    /// Store the record under `key` in `backend`.
    pub fn new(backend: Box<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Store the record under [`DEFAULT_KEY`].
    pub fn with_default_key(backend: Box<dyn StorageBackend>) -> Self {
        Self::new(backend, DEFAULT_KEY)
    }

    /// Namespace key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the record, substituting defaults for anything missing or corrupt.
    pub fn load(&self) -> Preferences {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return Preferences::default(),
            Err(e) => {
                debug!(key = %self.key, error = %e, "prefs: read failed; using defaults");
                return Preferences::default();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(v) => {
                let p = Preferences::from_value(&v);
                trace!(key = %self.key, order = ?p.order, "prefs: loaded");
                p
            }
            Err(e) => {
                debug!(key = %self.key, error = %e, "prefs: corrupt record; using defaults");
                Preferences::default()
            }
        }
    }

    /// Persist the whole record.
    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        let text = serde_json::to_string(prefs)?;
        self.backend.set(&self.key, &text)?;
        debug!(key = %self.key, order = ?prefs.order, "prefs: saved");
        Ok(())
    }

    /// Delete the record; the next load returns defaults.
    pub fn reset(&self) -> Result<()> {
        self.backend.delete(&self.key)?;
        debug!(key = %self.key, "prefs: reset");
        Ok(())
    }
}
