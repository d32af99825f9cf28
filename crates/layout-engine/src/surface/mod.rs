//! Reordering surface: an editable draft of the preferences.
//!
//! The surface never touches the host. It is seeded from the store and the
//! live sections, edited in memory, and turned back into [`Preferences`] on
//! save. [`crate::LayoutSession`] owns opening, committing and closing it.

mod drag;

use std::collections::BTreeMap;

use layout_prefs::Preferences;
use thiserror::Error;
use tracing::trace;

pub use drag::{DragState, RowLayout, RowSpan, UniformRows, insertion_point};

use crate::{apply::target_order, discovery::Section};

/// Reasons the surface cannot open.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// Discovery found nothing to edit.
    #[error("No accordions found on this page.")]
    NoSections,
}

/// One row as rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    /// Section title.
    pub title: String,
    /// Hide checkbox.
    pub hidden: bool,
    /// Open checkbox.
    pub open: bool,
}

/// User input the surface reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceCommand {
    /// Persist the draft and close.
    Save,
    /// Close without writing.
    Cancel,
    /// Clear the store and close.
    Reset,
    /// Clear every hide checkbox.
    ShowAll,
    /// Clear every open checkbox.
    OpenNone,
    /// Escape key; same as cancel.
    Escape,
    /// Click on the backdrop outside the panel; same as cancel.
    ClickOutside,
}

/// Editable draft of the layout preferences.
#[derive(Clone, Debug)]
pub struct ReorderSurface {
    /// Row titles in display order.
    rows: Vec<String>,
    /// Hidden flags, including titles not currently present.
    hidden: BTreeMap<String, bool>,
    /// Open checkbox per row.
    open: BTreeMap<String, bool>,
    /// Drag bookkeeping.
    drag: DragState,
}

impl ReorderSurface {
    /// Seed a draft from stored preferences and the live sections.
    ///
    /// `observed_open` supplies the open checkbox for rows without a stored
    /// wish.
    pub fn seed(
        prefs: &Preferences,
        sections: &[Section],
        mut observed_open: impl FnMut(&Section) -> bool,
    ) -> Result<Self, SurfaceError> {
        if sections.is_empty() {
            return Err(SurfaceError::NoSections);
        }
        let rows = target_order(&prefs.order, sections);
        let open = sections
            .iter()
            .map(|s| {
                let v = prefs
                    .desired_open(&s.title)
                    .unwrap_or_else(|| observed_open(s));
                (s.title.clone(), v)
            })
            .collect();
        Ok(Self {
            rows,
            hidden: prefs.hidden.clone(),
            open,
            drag: DragState::default(),
        })
    }

    /// Rows in display order.
    pub fn rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|t| Row {
                title: t.clone(),
                hidden: self.hidden.get(t).copied().unwrap_or(false),
                open: self.open.get(t).copied().unwrap_or(false),
            })
            .collect()
    }

    /// Row titles in display order.
    pub fn order(&self) -> &[String] {
        &self.rows
    }

    /// Set a row's hide checkbox. Returns false for an unknown title.
    pub fn set_hidden(&mut self, title: &str, hidden: bool) -> bool {
        if !self.has_row(title) {
            return false;
        }
        self.hidden.insert(title.to_string(), hidden);
        true
    }

    /// Set a row's open checkbox. Returns false for an unknown title.
    pub fn set_open(&mut self, title: &str, open: bool) -> bool {
        if !self.has_row(title) {
            return false;
        }
        self.open.insert(title.to_string(), open);
        true
    }

    /// Unhide every row.
    pub fn show_all(&mut self) {
        for t in &self.rows {
            self.hidden.insert(t.clone(), false);
        }
    }

    /// Close every row.
    pub fn open_none(&mut self) {
        for t in &self.rows {
            self.open.insert(t.clone(), false);
        }
    }

    /// Move `title` to `index` (clamped). Returns false for an unknown title.
    pub fn move_row(&mut self, title: &str, index: usize) -> bool {
        let Some(from) = self.rows.iter().position(|t| t == title) else {
            return false;
        };
        let row = self.rows.remove(from);
        let to = index.min(self.rows.len());
        self.rows.insert(to, row);
        true
    }

    /// Pointer down on a row's drag handle.
    pub fn pointer_down_on_handle(&mut self) {
        self.drag.arm();
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        self.drag.disarm();
    }

    /// Begin dragging `title`. Refused unless armed from a handle.
    pub fn drag_start(&mut self, title: &str) -> bool {
        self.has_row(title) && self.drag.start(title)
    }

    /// Pointer moved to `pointer_y` while dragging: reposition the dragged row
    /// live and return its new index.
    pub fn drag_over<L: RowLayout + ?Sized>(&mut self, pointer_y: f64, layout: &L) -> Option<usize> {
        let dragging = self.drag.dragging()?.to_string();
        let target = insertion_point(&self.rows, &dragging, pointer_y, layout);
        let from = self.rows.iter().position(|t| *t == dragging)?;
        let row = self.rows.remove(from);
        let to = target
            .as_ref()
            .and_then(|t| self.rows.iter().position(|r| r == t))
            .unwrap_or(self.rows.len());
        self.rows.insert(to, row);
        trace!(title = %dragging, to, target = ?target, "surface: drag over");
        self.drag.set_drop_target(target);
        Some(to)
    }

    /// Row the dragged row currently lands before.
    pub fn drop_target(&self) -> Option<&str> {
        self.drag.drop_target()
    }

    /// True while a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.dragging().is_some()
    }

    /// Row dropped: clear the highlight, keep the order.
    pub fn drop_row(&mut self) {
        self.drag.set_drop_target(None);
    }

    /// Drag finished or abandoned: clear all drag state.
    pub fn drag_end(&mut self) {
        self.drag.end();
    }

    /// Snapshot the draft: row order, the full hidden map, and an explicit
    /// open flag for every row.
    pub fn to_preferences(&self) -> Preferences {
        Preferences {
            order: self.rows.clone(),
            hidden: self.hidden.clone(),
            open_by_title: self
                .rows
                .iter()
                .map(|t| (t.clone(), self.open.get(t).copied().unwrap_or(false)))
                .collect(),
        }
    }

    /// Close the surface, keeping only its snapshot.
    pub fn into_preferences(self) -> Preferences {
        self.to_preferences()
    }

    /// True if `title` is a row.
    fn has_row(&self, title: &str) -> bool {
        self.rows.iter().any(|t| t == title)
    }
}
