//! Build a session from CLI inputs.

use std::{fs, path::Path, sync::Arc};

use layout_engine::{EngineCfg, LayoutSession};
use layout_host::{HostTree, MemoryHost, host_from_ron};
use layout_prefs::{FileBackend, MemoryBackend, PreferenceStore, StorageBackend};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::{
    cli::{HostArgs, StoreArgs},
    error::{Error, Result},
};

/// A fixture host bound to a session.
pub struct Harness {
    /// Fixture host, kept concrete for inspection.
    pub host: Arc<MemoryHost>,
    /// Session over `host`.
    pub session: LayoutSession,
}

impl Harness {
    /// Load the fixture, store and config named by `args`.
    pub fn open(args: &HostArgs) -> Result<Self> {
        let text = read(&args.tree)?;
        let host = Arc::new(host_from_ron(&text)?);
        let cfg = load_cfg(&args.store)?;
        let backend = backend(&args.store);
        let session =
            LayoutSession::with_backend(host.clone() as Arc<dyn HostTree>, backend, cfg)?;
        debug!(tree = %args.tree.display(), "harness ready");
        Ok(Self { host, session })
    }
}

/// Preference store selected by `args`, without a host.
pub fn store(args: &StoreArgs) -> Result<PreferenceStore> {
    let cfg = load_cfg(args)?;
    Ok(PreferenceStore::new(backend(args), cfg.store_key))
}

/// Single-threaded runtime with timers, for scheduled passes.
pub fn runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(Error::Runtime)
}

/// Configured engine settings, or defaults.
fn load_cfg(args: &StoreArgs) -> Result<EngineCfg> {
    match &args.config {
        Some(path) => Ok(EngineCfg::load_from_path(path)?),
        None => Ok(EngineCfg::default()),
    }
}

/// File-backed store when a directory is given, memory otherwise.
fn backend(args: &StoreArgs) -> Box<dyn StorageBackend> {
    match &args.store {
        Some(dir) => Box::new(FileBackend::new(dir)),
        None => Box::new(MemoryBackend::new()),
    }
}

/// Read a text file, tagging errors with its path.
fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
