use std::time::Duration;

use layout_host::{HostTree, query::select_first};
use tokio::time::sleep;
use tracing::{debug, trace};

use super::{Resolution, SectionFailure};
use crate::{
    CompiledSelectors, ReconcileCfg,
    discovery::{Section, find_section, read_open},
};

/// Where a section's reconciliation currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing observed yet.
    Unverified,
    /// About to activate the toggle for attempt `attempt` (0-based).
    Clicking {
        /// Attempt index into the backoff schedule.
        attempt: usize,
    },
    /// Waiting out the backoff after attempt `attempt`, then re-reading.
    Confirming {
        /// Attempt index into the backoff schedule.
        attempt: usize,
    },
    /// Overriding the body's visibility directly.
    ForcedShow,
    /// Waiting out the force confirmation delay, then re-reading.
    ConfirmingForced,
    /// Terminal.
    Done(Result<Resolution, SectionFailure>),
}

/// Drives one section toward a desired open state.
///
/// Every transition re-resolves the section from the live host, so a host
/// re-render between steps is tolerated.
pub struct OpenStateMachine<'a> {
    /// Live host.
    host: &'a dyn HostTree,
    /// Structural cues.
    cues: &'a CompiledSelectors,
    /// Per-attempt waits.
    backoff: Vec<Duration>,
    /// Wait before confirming a forced override.
    force_confirm: Duration,
    /// Section identity.
    title: &'a str,
    /// Target state.
    desired: bool,
    /// Current phase.
    phase: Phase,
    /// Toggle activations delivered so far.
    activations: u32,
    /// A toggle was found at least once.
    toggle_seen: bool,
}

impl<'a> OpenStateMachine<'a> {
    /// Prepare a machine for `title` targeting `desired`.
    pub fn new(
        host: &'a dyn HostTree,
        cues: &'a CompiledSelectors,
        cfg: &ReconcileCfg,
        title: &'a str,
        desired: bool,
    ) -> Self {
        Self {
            host,
            cues,
            backoff: cfg.backoff(),
            force_confirm: cfg.force_confirm(),
            title,
            desired,
            phase: Phase::Unverified,
            activations: 0,
            toggle_seen: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run to a terminal phase.
    pub async fn run(mut self) -> Result<Resolution, SectionFailure> {
        loop {
            if let Phase::Done(result) = self.phase {
                return result;
            }
            let next = self.step().await;
            trace!(title = %self.title, from = ?self.phase, to = ?next, "reconcile: transition");
            self.phase = next;
        }
    }

    /// Perform the work of the current phase and return the next one.
    async fn step(&mut self) -> Phase {
        match self.phase {
            Phase::Unverified => self.on_unverified(),
            Phase::Clicking { attempt } => self.on_clicking(attempt),
            Phase::Confirming { attempt } => self.on_confirming(attempt).await,
            Phase::ForcedShow => self.on_forced_show().await,
            Phase::ConfirmingForced => self.on_confirming_forced(),
            Phase::Done(r) => Phase::Done(r),
        }
    }

    /// Fresh section lookup.
    fn resolve(&mut self) -> Option<Section> {
        let s = find_section(self.host, self.cues, self.title)?;
        self.toggle_seen |= s.toggle.is_some();
        Some(s)
    }

    /// True if the section currently shows the desired state.
    fn satisfied(&self, s: &Section) -> bool {
        read_open(self.host, self.cues, s) == self.desired
    }

    /// Initial read: done, click, or force.
    fn on_unverified(&mut self) -> Phase {
        let Some(s) = self.resolve() else {
            return Phase::Done(Err(SectionFailure::NotFound));
        };
        if self.satisfied(&s) {
            return Phase::Done(Ok(Resolution::AlreadySatisfied));
        }
        if s.toggle.is_none() || self.backoff.is_empty() {
            return Phase::ForcedShow;
        }
        Phase::Clicking { attempt: 0 }
    }

    /// Re-check, then activate the toggle once.
    fn on_clicking(&mut self, attempt: usize) -> Phase {
        let Some(s) = self.resolve() else {
            return Phase::Done(Err(SectionFailure::NotFound));
        };
        if self.satisfied(&s) {
            return Phase::Done(Ok(Resolution::Toggled {
                attempts: self.activations,
            }));
        }
        let Some(toggle) = s.toggle else {
            return Phase::ForcedShow;
        };
        let delivered = match self.host.dispatch_click(toggle) {
            Ok(()) => true,
            Err(e) => {
                trace!(title = %self.title, error = %e, "reconcile: dispatch refused; direct click");
                self.host.click(toggle).is_ok()
            }
        };
        if delivered {
            self.activations += 1;
        }
        Phase::Confirming { attempt }
    }

    /// Wait, then confirm the attempt took.
    async fn on_confirming(&mut self, attempt: usize) -> Phase {
        sleep(self.backoff.get(attempt).copied().unwrap_or_default()).await;
        let Some(s) = self.resolve() else {
            return Phase::Done(Err(SectionFailure::NotFound));
        };
        if self.satisfied(&s) {
            return Phase::Done(Ok(Resolution::Toggled {
                attempts: self.activations,
            }));
        }
        trace!(title = %self.title, attempt, "reconcile: action-ineffective");
        if attempt + 1 < self.backoff.len() {
            Phase::Clicking {
                attempt: attempt + 1,
            }
        } else {
            Phase::ForcedShow
        }
    }

    /// Override the body's visibility directly, then wait.
    async fn on_forced_show(&mut self) -> Phase {
        let Some(s) = self.resolve() else {
            return Phase::Done(Err(SectionFailure::NotFound));
        };
        let body = s
            .body
            .or_else(|| select_first(self.host, s.container, &self.cues.collapse));
        match body {
            Some(b) => {
                let writes = [
                    self.host.set_class(b, &self.cues.transition_class, false),
                    self.host.clear_inline_height(b),
                    self.host.set_class(b, &self.cues.open_class, self.desired),
                ];
                if let Some(Err(e)) = writes.into_iter().find(Result::is_err) {
                    debug!(title = %self.title, error = %e, "reconcile: force write failed");
                }
            }
            None => debug!(title = %self.title, "reconcile: no body to force"),
        }
        sleep(self.force_confirm).await;
        Phase::ConfirmingForced
    }

    /// Final read after forcing.
    fn on_confirming_forced(&mut self) -> Phase {
        let Some(s) = self.resolve() else {
            return Phase::Done(Err(SectionFailure::NotFound));
        };
        if self.satisfied(&s) {
            return Phase::Done(Ok(Resolution::Forced {
                attempts: self.activations,
            }));
        }
        Phase::Done(Err(SectionFailure::ForceDidNotTake {
            toggle_present: self.toggle_seen,
        }))
    }
}
