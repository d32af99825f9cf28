//! layout-engine: keep a host's accordion sections in the user's preferred
//! order, visibility and open state.
//!
//! The host re-renders on its own schedule and ignores some of our writes, so
//! the engine never trusts a handle or an action. It rediscovers sections
//! before each step ([`discovery`]), applies order and visibility only where
//! they differ ([`apply`]), drives open state through a confirm-and-retry state
//! machine ([`reconcile`]), and edits preferences through a draft
//! ([`surface`]). [`LayoutSession`] wires these to a host and a store and
//! schedules the reconciliation passes.

pub mod apply;
mod config;
pub mod discovery;
mod error;
pub mod reconcile;
mod session;
pub mod surface;

pub use apply::ApplyReport;
pub use config::{CompiledSelectors, EngineCfg, ReconcileCfg, ScheduleCfg, SelectorCfg};
pub use discovery::Section;
pub use error::{Error, Result};
pub use reconcile::{ReconcileReport, Resolution, SectionFailure, SectionOutcome};
pub use session::{LayoutSession, ScheduledPasses, SurfaceFlow};
pub use surface::{ReorderSurface, Row, SurfaceCommand, SurfaceError, UniformRows};
