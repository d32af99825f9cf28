//! Open-state reconciliation: drive each visible section toward its stored
//! open/closed wish, confirming every action against the live host.
//!
//! Failures here are data, not errors. A pass always completes and returns a
//! [`ReconcileReport`]; per-section problems are summarized in the log.

mod machine;

use layout_host::HostTree;
use layout_prefs::Preferences;
use tracing::{debug, warn};

pub use machine::{OpenStateMachine, Phase};

use crate::{CompiledSelectors, ReconcileCfg, discovery::discover};

/// How a section reached its desired state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Observed state already matched; nothing was done.
    AlreadySatisfied,
    /// A toggle activation took effect.
    Toggled {
        /// Activations delivered.
        attempts: u32,
    },
    /// The direct visibility override took effect.
    Forced {
        /// Toggle activations delivered before forcing.
        attempts: u32,
    },
    /// Section is hidden; open state is irrelevant.
    SkippedHidden,
    /// No desired state recorded; observed state is kept.
    SkippedUnspecified,
}

/// Why a section did not reach its desired state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionFailure {
    /// The section could not be resolved at some step.
    NotFound,
    /// Toggling and forcing both failed to produce the desired state.
    ForceDidNotTake {
        /// A toggle existed, so clicks were tried first.
        toggle_present: bool,
    },
}

impl SectionFailure {
    /// Short reason for diagnostics.
    pub fn reason(self) -> &'static str {
        match self {
            Self::NotFound => "section not found",
            Self::ForceDidNotTake {
                toggle_present: true,
            } => "click did not take",
            Self::ForceDidNotTake {
                toggle_present: false,
            } => "no toggle found",
        }
    }
}

/// Result for one title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionOutcome {
    /// Section title.
    pub title: String,
    /// Target state, when one was recorded.
    pub desired: Option<bool>,
    /// What happened.
    pub result: Result<Resolution, SectionFailure>,
}

/// Outcomes of one reconciliation pass, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// One entry per title considered.
    pub outcomes: Vec<SectionOutcome>,
}

impl ReconcileReport {
    /// Outcomes that did not reach the desired state.
    pub fn failures(&self) -> impl Iterator<Item = &SectionOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// True if every considered section succeeded or was skipped.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Outcome for `title`, if it was considered.
    pub fn get(&self, title: &str) -> Option<&SectionOutcome> {
        self.outcomes.iter().find(|o| o.title == title)
    }
}

/// Run one pass over every title, sequentially.
///
/// Titles come from the stored order when it is non-empty, otherwise from
/// discovery. An empty host yields an empty report.
pub async fn reconcile_pass(
    host: &dyn HostTree,
    cues: &CompiledSelectors,
    cfg: &ReconcileCfg,
    prefs: &Preferences,
) -> ReconcileReport {
    let sections = discover(host, cues);
    if sections.is_empty() {
        debug!("reconcile: no sections yet");
        return ReconcileReport::default();
    }
    let titles: Vec<String> = if prefs.order.is_empty() {
        sections.into_iter().map(|s| s.title).collect()
    } else {
        prefs.order.clone()
    };

    let mut report = ReconcileReport::default();
    for title in titles {
        let desired = prefs.desired_open(&title);
        let result = if prefs.is_hidden(&title) {
            Ok(Resolution::SkippedHidden)
        } else if let Some(want) = desired {
            OpenStateMachine::new(host, cues, cfg, &title, want).run().await
        } else {
            Ok(Resolution::SkippedUnspecified)
        };
        debug!(%title, ?desired, ?result, "reconcile: section done");
        report.outcomes.push(SectionOutcome {
            title,
            desired,
            result,
        });
    }
    log_failures(&report);
    report
}

/// One summary line plus one line per failed section.
fn log_failures(report: &ReconcileReport) {
    let failed: Vec<&SectionOutcome> = report.failures().collect();
    if failed.is_empty() {
        return;
    }
    warn!(
        failed = failed.len(),
        total = report.outcomes.len(),
        "some sections did not reach desired open/closed state"
    );
    for o in failed {
        if let Err(f) = o.result {
            warn!(title = %o.title, desired = ?o.desired, reason = f.reason(), "reconcile: failed");
        }
    }
}
