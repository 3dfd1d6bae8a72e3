//! Render columns and their row/indicator slot tables.
//!
//! The engine drives two parallel render tracks sharing the same row indices:
//! the label column (node names, indented by depth) and the timeline column
//! (interval bars). Rows are registered per virtualization slot, so a
//! re-registration at the same index overwrites the previous occupant; slots
//! are explicitly occupied or empty rather than nullable entries.

use std::cell::RefCell;
use std::rc::Weak;

use crate::traits::{GeometrySink, NodeId};

/// The two render tracks driven by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// The left track: row labels with depth indentation and sub-scroll.
    Label,
    /// The right track: interval bars placed by the composed transform.
    Timeline,
}

/// Geometry metadata for one rendered row, bound to host-owned sinks.
///
/// Ephemeral: re-registered whenever the virtualized window renders a row
/// into a given slot. Identified by row index, not node identity.
pub struct RowRegistration {
    /// The data node rendered in this row, if bound.
    pub node: Option<NodeId>,
    /// Tree depth of the node, for indentation math in the label column.
    pub depth: usize,
    /// True for buffer rows rendered outside the visible window. Overscan
    /// rows are excluded from sub-scroll bounds checks.
    pub overscan: bool,
    /// Data interval `(start, duration)` in absolute time, for timeline rows.
    pub span: Option<(f64, f64)>,
    /// Inline label text plus its own sink, for timeline rows.
    pub label: Option<(String, Weak<RefCell<dyn GeometrySink>>)>,
    /// The row content element.
    pub sink: Weak<RefCell<dyn GeometrySink>>,
}

impl RowRegistration {
    /// Creates a label-column registration for a node at a given depth.
    pub fn label_row(
        node: NodeId,
        depth: usize,
        overscan: bool,
        sink: Weak<RefCell<dyn GeometrySink>>,
    ) -> Self {
        Self { node: Some(node), depth, overscan, span: None, label: None, sink }
    }

    /// Creates a timeline-column registration for an interval bar.
    pub fn timeline_row(
        node: NodeId,
        start: f64,
        duration: f64,
        sink: Weak<RefCell<dyn GeometrySink>>,
    ) -> Self {
        Self {
            node: Some(node),
            depth: 0,
            overscan: false,
            span: Some((start, duration)),
            label: None,
            sink,
        }
    }

    /// Attaches an inline label and its sink to a timeline registration.
    pub fn with_label(
        mut self,
        text: impl Into<String>,
        sink: Weak<RefCell<dyn GeometrySink>>,
    ) -> Self {
        self.label = Some((text.into(), sink));
        self
    }
}

/// A virtualization slot in a column's row table.
#[derive(Default)]
pub enum RowSlot {
    #[default]
    Empty,
    Occupied(RowRegistration),
}

impl RowSlot {
    /// Returns the registration if the slot is occupied.
    pub fn registration(&self) -> Option<&RowRegistration> {
        match self {
            RowSlot::Empty => None,
            RowSlot::Occupied(reg) => Some(reg),
        }
    }
}

/// One render track: committed width fraction, row slots, and (for the label
/// column) the horizontal sub-scroll offset.
pub struct Column {
    /// Committed width as a fraction of the container (0..1).
    pub width: f64,
    /// Horizontal sub-scroll translate in px, always <= 0. Only the label
    /// column ever moves it.
    pub translate_x: f64,
    /// Row slot table indexed by virtualization row slot.
    pub rows: Vec<RowSlot>,
}

impl Column {
    /// Creates a column with the given committed width fraction.
    pub fn new(width: f64) -> Self {
        Self { width, translate_x: 0.0, rows: Vec::new() }
    }

    /// Stores a registration at a row slot, growing the table as needed.
    /// Overwrites any previous occupant of that slot.
    pub fn set_row(&mut self, index: usize, registration: RowRegistration) {
        if index >= self.rows.len() {
            self.rows.resize_with(index + 1, RowSlot::default);
        }
        self.rows[index] = RowSlot::Occupied(registration);
    }

    /// Clears a row slot. Out-of-range indices are no-ops: the slot was
    /// never occupied.
    pub fn clear_row(&mut self, index: usize) {
        if let Some(slot) = self.rows.get_mut(index) {
            *slot = RowSlot::Empty;
        }
    }

    /// Iterates over occupied registrations.
    pub fn occupied(&self) -> impl Iterator<Item = &RowRegistration> {
        self.rows.iter().filter_map(RowSlot::registration)
    }
}

/// An overlay marker positioned purely by the current transform.
pub struct Indicator {
    /// Absolute timestamp the marker points at.
    pub timestamp: f64,
    /// The marker element.
    pub sink: Weak<RefCell<dyn GeometrySink>>,
}

/// Slot table entry for indicators, same occupied/empty shape as rows.
#[derive(Default)]
pub enum IndicatorSlot {
    #[default]
    Empty,
    Occupied(Indicator),
}

impl IndicatorSlot {
    /// Returns the indicator if the slot is occupied.
    pub fn indicator(&self) -> Option<&Indicator> {
        match self {
            IndicatorSlot::Empty => None,
            IndicatorSlot::Occupied(indicator) => Some(indicator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct NullSink;
    impl GeometrySink for NullSink {}

    fn sink() -> (Rc<RefCell<dyn GeometrySink>>, Weak<RefCell<dyn GeometrySink>>) {
        let strong: Rc<RefCell<dyn GeometrySink>> = Rc::new(RefCell::new(NullSink));
        let weak = Rc::downgrade(&strong);
        (strong, weak)
    }

    #[test]
    fn test_set_row_grows_and_overwrites() {
        let mut column = Column::new(0.5);
        let (_a, weak_a) = sink();
        let (_b, weak_b) = sink();

        column.set_row(3, RowRegistration::label_row(10, 1, false, weak_a));
        assert_eq!(column.rows.len(), 4);
        assert!(column.rows[0].registration().is_none());
        assert_eq!(column.rows[3].registration().unwrap().node, Some(10));

        // Re-registration at the same slot replaces the occupant.
        column.set_row(3, RowRegistration::label_row(20, 2, true, weak_b));
        assert_eq!(column.rows[3].registration().unwrap().node, Some(20));
        assert_eq!(column.occupied().count(), 1);
    }

    #[test]
    fn test_clear_row() {
        let mut column = Column::new(0.5);
        let (_a, weak_a) = sink();

        column.set_row(0, RowRegistration::label_row(1, 0, false, weak_a));
        column.clear_row(0);
        assert!(column.rows[0].registration().is_none());

        // Clearing a slot that never existed is fine.
        column.clear_row(99);
    }
}
