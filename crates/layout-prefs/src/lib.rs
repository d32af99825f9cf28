//! layout-prefs: durable storage of the desired accordion layout.
//!
//! A single namespaced record holds the whole [`Preferences`] structure as
//! JSON. Reads never fail: an absent, unparsable or mistyped record yields
//! defaults. Writes always replace the whole record.

mod backend;
mod error;
mod prefs;
mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use error::{PrefsError, Result};
pub use prefs::Preferences;
pub use store::{DEFAULT_KEY, PreferenceStore};
