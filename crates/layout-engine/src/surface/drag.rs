//! Handle-armed drag reordering.

/// Vertical extent of a rendered row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowSpan {
    /// Top edge.
    pub top: f64,
    /// Height.
    pub height: f64,
}

impl RowSpan {
    /// Vertical midpoint.
    pub fn mid(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Reports where each row is currently drawn.
pub trait RowLayout {
    /// Span of the row at `index` in the current list, titled `title`.
    fn span(&self, index: usize, title: &str) -> Option<RowSpan>;
}

/// Fixed-height rows stacked from `origin` with `gap` between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformRows {
    /// Top of the first row.
    pub origin: f64,
    /// Row height.
    pub height: f64,
    /// Space between rows.
    pub gap: f64,
}

impl RowLayout for UniformRows {
    fn span(&self, index: usize, _title: &str) -> Option<RowSpan> {
        Some(RowSpan {
            top: self.origin + index as f64 * (self.height + self.gap),
            height: self.height,
        })
    }
}

/// Per-surface drag bookkeeping.
///
/// A drag may only start while armed, and arming only happens from a row's
/// handle, so text selection in the rest of a row never turns into a drag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DragState {
    /// Pointer went down on a handle and has not been released.
    armed: bool,
    /// Title of the row being dragged.
    dragging: Option<String>,
    /// Row the dragged row will land before, for highlighting.
    drop_target: Option<String>,
}

impl DragState {
    /// Pointer down on a row handle.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Pointer released anywhere.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// True while armed.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Begin dragging `title`; refused unless armed.
    pub fn start(&mut self, title: &str) -> bool {
        if !self.armed {
            return false;
        }
        self.dragging = Some(title.to_string());
        true
    }

    /// Title being dragged.
    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    /// Current drop target.
    pub fn drop_target(&self) -> Option<&str> {
        self.drop_target.as_deref()
    }

    /// Record the drop target.
    pub(super) fn set_drop_target(&mut self, target: Option<String>) {
        self.drop_target = target;
    }

    /// Drag finished (dropped or abandoned): clear everything.
    pub fn end(&mut self) {
        *self = Self::default();
    }
}

/// Row that the dragged row should be inserted before.
///
/// Among rows other than `dragging`, picks the one whose midpoint is the
/// closest below `pointer_y`. `None` means "append at the end".
pub fn insertion_point<L: RowLayout + ?Sized>(
    rows: &[String],
    dragging: &str,
    pointer_y: f64,
    layout: &L,
) -> Option<String> {
    let mut best: Option<(f64, &String)> = None;
    for (i, title) in rows.iter().enumerate() {
        if title == dragging {
            continue;
        }
        let Some(span) = layout.span(i, title) else {
            continue;
        };
        let offset = pointer_y - span.mid();
        if offset < 0.0 && best.is_none_or(|(b, _)| offset > b) {
            best = Some((offset, title));
        }
    }
    best.map(|(_, t)| t.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(t: &[&str]) -> Vec<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    const LAYOUT: UniformRows = UniformRows {
        origin: 0.0,
        height: 40.0,
        gap: 8.0,
    };

    #[test]
    fn start_requires_arming() {
        let mut d = DragState::default();
        assert!(!d.start("A"));
        d.arm();
        assert!(d.start("A"));
        assert_eq!(d.dragging(), Some("A"));
        d.end();
        assert_eq!(d, DragState::default());
    }

    #[test]
    fn picks_nearest_row_below_pointer() {
        let r = rows(&["A", "B", "C"]);
        // Mids: A=20, B=68, C=116.
        assert_eq!(insertion_point(&r, "C", 5.0, &LAYOUT).as_deref(), Some("A"));
        assert_eq!(insertion_point(&r, "A", 50.0, &LAYOUT).as_deref(), Some("B"));
        assert_eq!(insertion_point(&r, "A", 200.0, &LAYOUT), None);
    }

    #[test]
    fn dragged_row_is_never_a_target() {
        let r = rows(&["A", "B"]);
        assert_eq!(insertion_point(&r, "A", 0.0, &LAYOUT).as_deref(), Some("B"));
    }
}
