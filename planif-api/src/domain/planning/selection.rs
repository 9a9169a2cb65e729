//! Multi-cell drag selection over one row of the week axis.
//!
//! The state machine is driven by discrete pointer events and never touches
//! more than one row. Toolbar placement is a pure function of the selection
//! and the grid's layout metrics.

use serde::{Deserialize, Serialize};

use crate::domain::week::WeekKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEvent<R> {
    PointerDown { row: R, week_index: usize },
    PointerMove { row: R, week_index: usize },
    PointerUp,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SelectionPhase<R> {
    Idle,
    Dragging { row: R, start: usize, end: usize },
    Selected { row: R, start: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragSelection<R> {
    phase: SelectionPhase<R>,
    last_hovered: Option<usize>,
}

impl<R> Default for DragSelection<R> {
    fn default() -> Self {
        Self {
            phase: SelectionPhase::Idle,
            last_hovered: None,
        }
    }
}

impl<R: Clone + PartialEq> DragSelection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SelectionPhase<R> {
        &self.phase
    }

    pub fn last_hovered(&self) -> Option<usize> {
        self.last_hovered
    }

    pub fn handle(&mut self, event: SelectionEvent<R>) {
        let phase = std::mem::replace(&mut self.phase, SelectionPhase::Idle);
        self.phase = match (phase, event) {
            (_, SelectionEvent::Cancel) => {
                self.last_hovered = None;
                SelectionPhase::Idle
            }
            (_, SelectionEvent::PointerDown { row, week_index }) => {
                self.last_hovered = Some(week_index);
                SelectionPhase::Dragging {
                    row,
                    start: week_index,
                    end: week_index,
                }
            }
            (SelectionPhase::Dragging { row, start, end }, SelectionEvent::PointerMove { row: over, week_index }) => {
                if over == row {
                    self.last_hovered = Some(week_index);
                    SelectionPhase::Dragging {
                        row,
                        start,
                        end: week_index,
                    }
                } else {
                    SelectionPhase::Dragging { row, start, end }
                }
            }
            (SelectionPhase::Dragging { row, start, end }, SelectionEvent::PointerUp) => {
                SelectionPhase::Selected { row, start, end }
            }
            (phase, _) => phase,
        };
    }

    /// Replays `events` from idle.
    pub fn replay(events: impl IntoIterator<Item = SelectionEvent<R>>) -> Self {
        let mut selection = Self::new();
        events.into_iter().for_each(|e| selection.handle(e));
        selection
    }

    /// The contiguous index range covered so far, whichever way the drag went.
    pub fn range(&self) -> Option<(usize, usize)> {
        match self.phase {
            SelectionPhase::Idle => None,
            SelectionPhase::Dragging { start, end, .. } | SelectionPhase::Selected { start, end, .. } => {
                Some((start.min(end), start.max(end)))
            }
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self.phase, SelectionPhase::Selected { .. })
    }

    /// The (row, week) pairs a bulk apply writes to.
    ///
    /// Empty unless the drag has been released. Indices past the end of the
    /// axis are ignored.
    pub fn targets(&self, axis: &[WeekKey]) -> Vec<(R, WeekKey)> {
        let SelectionPhase::Selected { row, .. } = &self.phase else {
            return Vec::new();
        };
        let Some((lo, hi)) = self.range() else {
            return Vec::new();
        };
        if lo >= axis.len() {
            return Vec::new();
        }
        axis[lo..=hi.min(axis.len() - 1)]
            .iter()
            .map(|week| (row.clone(), *week))
            .collect()
    }
}

/// Pixel metrics of the rendered grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub origin_x: f64,
    pub origin_y: f64,
    pub label_width: f64,
    pub cell_width: f64,
    pub row_height: f64,
    pub viewport_width: f64,
    pub toolbar_width: f64,
    pub scroll_left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToolbarPosition {
    pub left: f64,
    pub top: f64,
}

/// Places the toolbar under the last hovered cell, kept inside the viewport.
///
/// `row_index` is the position of the selected row in the rendered grid.
/// Returns `None` unless a selection has been released.
pub fn toolbar_position<R: Clone + PartialEq>(
    selection: &DragSelection<R>,
    row_index: usize,
    layout: &GridLayout,
) -> Option<ToolbarPosition> {
    if !selection.is_selected() {
        return None;
    }
    let column = selection.last_hovered()?;

    let cell_left = layout.origin_x + layout.label_width + column as f64 * layout.cell_width - layout.scroll_left;
    let max_left = (layout.viewport_width - layout.toolbar_width).max(0.0);
    let left = cell_left.clamp(0.0, max_left);
    let top = layout.origin_y + (row_index + 1) as f64 * layout.row_height;

    Some(ToolbarPosition { left, top })
}
