//! Engine configuration: structural cues, timing, and the storage namespace.
//!
//! Every field has a default matching the host the engine was built against,
//! so an empty RON document `()` is a valid configuration.

use std::{fs, path::Path, result::Result as StdResult, time::Duration};

use layout_host::Selector;
use ron::{Options, error::SpannedError, extensions::Extensions};
use serde::Deserialize;

use crate::{Error, Result};

/// Selector text and marker names used to recognize sections in the host.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorCfg {
    /// Container whose children are the section containers.
    pub list: String,
    /// Title marker inside each section.
    pub title: String,
    /// Accordion element enclosing a title marker.
    pub accordion: String,
    /// Fallback container used when no accordion encloses the marker.
    pub fallback_container: String,
    /// Collapsible body inside an accordion.
    pub collapse: String,
    /// Interactive element that may be the toggle.
    pub interactive: String,
    /// Header-like element that may be the toggle.
    pub header: String,
    /// Header area surrounding the title marker.
    pub header_area: String,
    /// Class a body carries when open.
    pub open_class: String,
    /// Class the host leaves on a body mid-transition.
    pub transition_class: String,
    /// Attribute on the toggle reporting the expanded state.
    pub expanded_attr: String,
}

impl Default for SelectorCfg {
    fn default() -> Self {
        Self {
            list: ".job-details-accordion-list".into(),
            title: ".custom-accordion-header > p".into(),
            accordion: ".st-accordion.accordion".into(),
            fallback_container: "div".into(),
            collapse: "[data-testid='accordion-collapse']".into(),
            interactive: "button, [role='button']".into(),
            header: ".card-header, .accordion-header, .custom-button".into(),
            header_area: ".custom-accordion-header".into(),
            open_class: "show".into(),
            transition_class: "collapsing".into(),
            expanded_attr: "aria-expanded".into(),
        }
    }
}

/// Timing of the open-state reconciliation loop.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReconcileCfg {
    /// Wait after each toggle attempt, in milliseconds. One attempt per entry.
    pub backoff_ms: Vec<u64>,
    /// Wait before confirming a forced visibility override, in milliseconds.
    pub force_confirm_ms: u64,
}

impl Default for ReconcileCfg {
    fn default() -> Self {
        Self {
            backoff_ms: vec![200, 600, 1200],
            force_confirm_ms: 120,
        }
    }
}

impl ReconcileCfg {
    /// Backoff schedule as durations.
    pub fn backoff(&self) -> Vec<Duration> {
        self.backoff_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    /// Force confirmation delay.
    pub fn force_confirm(&self) -> Duration {
        Duration::from_millis(self.force_confirm_ms)
    }
}

/// Delays of the two reconciliation passes scheduled after an apply.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleCfg {
    /// Early pass, in milliseconds.
    pub early_pass_ms: u64,
    /// Late pass, catching slow first renders.
    pub late_pass_ms: u64,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            early_pass_ms: 350,
            late_pass_ms: 2000,
        }
    }
}

impl ScheduleCfg {
    /// Both pass delays, early first.
    pub fn delays(&self) -> [Duration; 2] {
        [
            Duration::from_millis(self.early_pass_ms),
            Duration::from_millis(self.late_pass_ms),
        ]
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineCfg {
    /// Structural cues.
    pub selectors: SelectorCfg,
    /// Namespace key of the preference record.
    pub store_key: String,
    /// Reconciler timing.
    pub reconcile: ReconcileCfg,
    /// Pass scheduling.
    pub schedule: ScheduleCfg,
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self {
            selectors: SelectorCfg::default(),
            store_key: layout_prefs::DEFAULT_KEY.to_string(),
            reconcile: ReconcileCfg::default(),
            schedule: ScheduleCfg::default(),
        }
    }
}

impl EngineCfg {
    /// Parse a configuration from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        parse(text).map_err(|e| Error::Config {
            path: None,
            message: e.to_string(),
        })
    }

    /// Read and parse a RON configuration file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::Config {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })?;
        parse(&text).map_err(|e| Error::Config {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })
    }

    /// Parse every selector, failing on the first invalid one.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        let s = &self.selectors;
        Ok(CompiledSelectors {
            list: Selector::parse(&s.list)?,
            title: Selector::parse(&s.title)?,
            accordion: Selector::parse(&s.accordion)?,
            fallback_container: Selector::parse(&s.fallback_container)?,
            collapse: Selector::parse(&s.collapse)?,
            interactive: Selector::parse(&s.interactive)?,
            header: Selector::parse(&s.header)?,
            header_area: Selector::parse(&s.header_area)?,
            open_class: s.open_class.clone(),
            transition_class: s.transition_class.clone(),
            expanded_attr: s.expanded_attr.clone(),
        })
    }
}

/// RON with implicit `Some` so optional overrides read naturally.
fn parse(text: &str) -> StdResult<EngineCfg, SpannedError> {
    Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str(text)
}

/// Compiled form of [`SelectorCfg`].
#[derive(Clone, Debug)]
pub struct CompiledSelectors {
    /// Section list container.
    pub list: Selector,
    /// Title marker.
    pub title: Selector,
    /// Accordion container.
    pub accordion: Selector,
    /// Fallback section container.
    pub fallback_container: Selector,
    /// Collapsible body.
    pub collapse: Selector,
    /// Interactive toggle candidates.
    pub interactive: Selector,
    /// Header-like toggle candidates.
    pub header: Selector,
    /// Header area around the title marker.
    pub header_area: Selector,
    /// Open class on the body.
    pub open_class: String,
    /// Mid-transition class on the body.
    pub transition_class: String,
    /// Expanded-state attribute on the toggle.
    pub expanded_attr: String,
}
