//! One engine instance bound to a host and a preference store.

use std::{result::Result as StdResult, sync::Arc};

use layout_host::HostTree;
use layout_prefs::{PreferenceStore, StorageBackend};
use tokio::{runtime::Handle, task::JoinHandle, time::sleep};
use tracing::{debug, info, warn};

use crate::{
    CompiledSelectors, EngineCfg, Error, Result,
    apply::{ApplyReport, apply_order_and_visibility},
    discovery::{Section, discover, read_open},
    reconcile::{ReconcileReport, reconcile_pass},
    surface::{ReorderSurface, SurfaceCommand, SurfaceError},
};

/// Handles of the reconciliation passes started by an apply.
///
/// Dropping this detaches the passes; they still run to completion.
#[derive(Debug)]
pub struct ScheduledPasses {
    /// Early pass first.
    handles: Vec<JoinHandle<ReconcileReport>>,
}

impl ScheduledPasses {
    /// Wait for every pass and collect the reports in schedule order.
    pub async fn join(self) -> Vec<ReconcileReport> {
        let mut out = Vec::with_capacity(self.handles.len());
        for h in self.handles {
            match h.await {
                Ok(r) => out.push(r),
                Err(e) => warn!(error = %e, "reconcile pass aborted"),
            }
        }
        out
    }
}

/// Result of feeding a command to an open surface.
#[derive(Debug)]
pub enum SurfaceFlow {
    /// The surface stays open.
    Open(ReorderSurface),
    /// The surface closed; passes were scheduled if the layout was reapplied.
    Closed(Option<ScheduledPasses>),
}

/// Shared state behind a [`LayoutSession`].
struct Inner {
    /// Live host tree.
    host: Arc<dyn HostTree>,
    /// Persisted preferences.
    store: Arc<PreferenceStore>,
    /// Parsed structural cues.
    cues: CompiledSelectors,
    /// Raw configuration.
    cfg: EngineCfg,
}

/// Entry point tying discovery, application, reconciliation and the surface
/// together. Cheap to clone.
#[derive(Clone)]
pub struct LayoutSession {
    /// Shared state.
    inner: Arc<Inner>,
}

impl LayoutSession {
    /// Bind `host` and `store` under `cfg`, compiling its selectors.
    pub fn new(host: Arc<dyn HostTree>, store: Arc<PreferenceStore>, cfg: EngineCfg) -> Result<Self> {
        let cues = cfg.compile()?;
        Ok(Self {
            inner: Arc::new(Inner {
                host,
                store,
                cues,
                cfg,
            }),
        })
    }

    /// Bind `host` to a store over `backend` using the configured namespace.
    pub fn with_backend(
        host: Arc<dyn HostTree>,
        backend: Box<dyn StorageBackend>,
        cfg: EngineCfg,
    ) -> Result<Self> {
        let store = Arc::new(PreferenceStore::new(backend, cfg.store_key.clone()));
        Self::new(host, store, cfg)
    }

    /// Host tree.
    pub fn host(&self) -> &Arc<dyn HostTree> {
        &self.inner.host
    }

    /// Preference store.
    pub fn store(&self) -> &Arc<PreferenceStore> {
        &self.inner.store
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineCfg {
        &self.inner.cfg
    }

    /// Fresh discovery.
    pub fn discover(&self) -> Vec<Section> {
        discover(self.inner.host.as_ref(), &self.inner.cues)
    }

    /// Observed open state of `section`.
    pub fn read_open(&self, section: &Section) -> bool {
        read_open(self.inner.host.as_ref(), &self.inner.cues, section)
    }

    /// Run the layout applier once.
    pub fn apply_order_and_visibility(&self) -> Option<ApplyReport> {
        apply_order_and_visibility(self.inner.host.as_ref(), &self.inner.cues, &self.inner.store)
    }

    /// Run one reconciliation pass against the current stored preferences.
    pub async fn reconcile_open_state(&self) -> ReconcileReport {
        let prefs = self.inner.store.load();
        reconcile_pass(
            self.inner.host.as_ref(),
            &self.inner.cues,
            &self.inner.cfg.reconcile,
            &prefs,
        )
        .await
    }

    /// Apply order and visibility now, then schedule the early and late
    /// reconciliation passes on the current Tokio runtime.
    ///
    /// Passes are independent and never cancelled; calling this again starts
    /// another pair. Outside a runtime this fails with [`Error::NoRuntime`]
    /// before touching the host.
    pub fn apply_layout_once(&self) -> Result<ScheduledPasses> {
        let rt = current_runtime()?;
        Ok(self.schedule_on(&rt))
    }

    /// Apply, then spawn both passes on `rt`.
    fn schedule_on(&self, rt: &Handle) -> ScheduledPasses {
        let applied = self.apply_order_and_visibility();
        debug!(applied = applied.is_some(), "apply_layout_once");
        let handles = self
            .inner
            .cfg
            .schedule
            .delays()
            .into_iter()
            .map(|delay| {
                let session = self.clone();
                rt.spawn(async move {
                    sleep(delay).await;
                    session.reconcile_open_state().await
                })
            })
            .collect();
        ScheduledPasses { handles }
    }

    /// Open a reordering surface seeded from the store and the live host.
    pub fn open_surface(&self) -> StdResult<ReorderSurface, SurfaceError> {
        let prefs = self.inner.store.load();
        let sections = self.discover();
        ReorderSurface::seed(&prefs, &sections, |s| self.read_open(s))
    }

    /// Save: persist the draft, close, and reapply.
    ///
    /// A failed write is logged; the layout is reapplied from whatever the
    /// store holds. Without a runtime nothing is written and the draft is
    /// dropped.
    pub fn commit(&self, surface: ReorderSurface) -> Result<ScheduledPasses> {
        let rt = current_runtime()?;
        let prefs = surface.into_preferences();
        match self.inner.store.save(&prefs) {
            Ok(()) => info!(order = ?prefs.order, "surface: saved"),
            Err(e) => warn!(error = %e, "surface: save failed"),
        }
        Ok(self.schedule_on(&rt))
    }

    /// Reset: clear the store, close, and reapply.
    pub fn reset(&self, surface: ReorderSurface) -> Result<ScheduledPasses> {
        let rt = current_runtime()?;
        drop(surface);
        match self.inner.store.reset() {
            Ok(()) => info!("surface: preferences reset"),
            Err(e) => warn!(error = %e, "surface: reset failed"),
        }
        Ok(self.schedule_on(&rt))
    }

    /// Cancel: close without writing.
    pub fn cancel(&self, surface: ReorderSurface) {
        drop(surface);
        debug!("surface: cancelled");
    }

    /// Feed a command to an open surface.
    ///
    /// Only `Save` and `Reset` can fail, and only outside a Tokio runtime.
    pub fn handle(&self, mut surface: ReorderSurface, cmd: SurfaceCommand) -> Result<SurfaceFlow> {
        let flow = match cmd {
            SurfaceCommand::ShowAll => {
                surface.show_all();
                SurfaceFlow::Open(surface)
            }
            SurfaceCommand::OpenNone => {
                surface.open_none();
                SurfaceFlow::Open(surface)
            }
            SurfaceCommand::Save => SurfaceFlow::Closed(Some(self.commit(surface)?)),
            SurfaceCommand::Reset => SurfaceFlow::Closed(Some(self.reset(surface)?)),
            SurfaceCommand::Cancel | SurfaceCommand::Escape | SurfaceCommand::ClickOutside => {
                self.cancel(surface);
                SurfaceFlow::Closed(None)
            }
        };
        Ok(flow)
    }
}

/// Handle of the runtime the caller is running on.
fn current_runtime() -> Result<Handle> {
    Handle::try_current().map_err(|_| Error::NoRuntime)
}
