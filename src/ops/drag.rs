use std::collections::HashMap;

use crate::model::list::TaskList;
use crate::model::task::TaskId;

use super::hierarchy::descendant_closure;
use super::task_ops::{self, MoveEdge, TaskError};

/// On-screen geometry of one rendered task row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGeometry {
    pub top: f64,
    pub center_y: f64,
    pub bottom: f64,
    /// Left edge of the row's title; right of it means "drop as child"
    pub left: f64,
    pub width: f64,
}

/// Source of current row positions, keyed by task id
pub trait GeometryProvider {
    fn row_geometry(&self, id: TaskId) -> Option<RowGeometry>;
}

impl<F> GeometryProvider for F
where
    F: Fn(TaskId) -> Option<RowGeometry>,
{
    fn row_geometry(&self, id: TaskId) -> Option<RowGeometry> {
        self(id)
    }
}

impl GeometryProvider for HashMap<TaskId, RowGeometry> {
    fn row_geometry(&self, id: TaskId) -> Option<RowGeometry> {
        self.get(&id).copied()
    }
}

/// Where the dragged task would land if released now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTarget {
    pub id: TaskId,
    pub edge: MoveEdge,
    /// Bottom edge of the target row, where a drop indicator belongs
    pub indicator_y: f64,
    /// Left edge of the target row's title
    pub indicator_left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: TaskId,
        pending: Option<DropTarget>,
    },
}

/// Result of releasing the pointer
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// No session was active
    NotDragging,
    /// The pointer never resolved to a target
    NoTarget,
    Moved {
        task: TaskId,
        target: TaskId,
        edge: MoveEdge,
    },
    /// The move was refused; the list is unchanged
    Rejected(TaskError),
}

/// Nearest-row drop resolution for a pointer position.
///
/// Scans every visible task in collection order; rows without geometry are
/// skipped. Ties on distance go to the first row scanned.
pub fn resolve_drop_target<G>(x: f64, y: f64, list: &TaskList, geometry: &G) -> Option<DropTarget>
where
    G: GeometryProvider + ?Sized,
{
    let mut best: Option<(TaskId, RowGeometry, f64)> = None;
    for task in &list.visible {
        let Some(row) = geometry.row_geometry(task.id) else {
            continue;
        };
        let dist = (y - row.center_y).abs();
        if best.is_none_or(|(_, _, d)| dist < d) {
            best = Some((task.id, row, dist));
        }
    }
    best.map(|(id, row, _)| DropTarget {
        id,
        edge: if x > row.left {
            MoveEdge::Child
        } else {
            MoveEdge::Sibling
        },
        indicator_y: row.bottom,
        indicator_left: row.left,
    })
}

/// One drag interaction: Idle → Dragging → Idle.
///
/// The visible row whose vertical centre is nearest the pointer is the
/// target; the pointer's horizontal position against that row's left edge
/// picks between "sibling after it" and "child of it".
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn source(&self) -> Option<TaskId> {
        match self.state {
            DragState::Dragging { source, .. } => Some(source),
            DragState::Idle => None,
        }
    }

    pub fn pending(&self) -> Option<DropTarget> {
        match self.state {
            DragState::Dragging { pending, .. } => pending,
            DragState::Idle => None,
        }
    }

    /// Begin dragging `source`. Ignored (returns false) while a drag is active.
    pub fn start(&mut self, source: TaskId) -> bool {
        if self.is_active() {
            tracing::debug!(source, "ignoring re-entrant drag start");
            return false;
        }
        self.state = DragState::Dragging {
            source,
            pending: None,
        };
        true
    }

    /// Re-resolve the pending target for a pointer position. Keeps the previous
    /// target when no row has geometry. Returns the pending target.
    pub fn pointer_moved<G>(
        &mut self,
        x: f64,
        y: f64,
        list: &TaskList,
        geometry: &G,
    ) -> Option<DropTarget>
    where
        G: GeometryProvider + ?Sized,
    {
        let DragState::Dragging { pending, .. } = &mut self.state else {
            return None;
        };
        if let Some(target) = resolve_drop_target(x, y, list, geometry) {
            *pending = Some(target);
        }
        *pending
    }

    /// Release the pointer: apply the pending move unless the target is the
    /// dragged task or one of its descendants. Always returns to Idle.
    pub fn finish(&mut self, list: &mut TaskList) -> DragOutcome {
        let DragState::Dragging { source, pending } = std::mem::take(&mut self.state) else {
            return DragOutcome::NotDragging;
        };
        let Some(target) = pending else {
            return DragOutcome::NoTarget;
        };

        match descendant_closure(source, &list.visible) {
            Ok(closure) if closure.contains(&target.id) => {
                tracing::warn!(task = source, target = target.id, "drop onto own subtree rejected");
                return DragOutcome::Rejected(TaskError::InvalidMove {
                    task: source,
                    target: target.id,
                });
            }
            Ok(_) => {}
            Err(e) => return DragOutcome::Rejected(e),
        }

        match task_ops::move_task(list, source, target.id, target.edge) {
            Ok(()) => DragOutcome::Moved {
                task: source,
                target: target.id,
                edge: target.edge,
            },
            Err(e) => DragOutcome::Rejected(e),
        }
    }

    /// Abandon the session without moving anything. Returns whether a drag was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = DragState::Idle;
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::task_ops::{InsertPosition, add_task, toggle_expand};
    use pretty_assertions::assert_eq;

    /// Rows 20 units tall stacked from y=0, indented 4 units per depth level
    fn layout(list: &TaskList) -> HashMap<TaskId, RowGeometry> {
        let forest = crate::ops::hierarchy::build_tree(&list.visible);
        crate::ops::hierarchy::flatten(&forest)
            .iter()
            .enumerate()
            .map(|(row, flat)| {
                let top = row as f64 * 20.0;
                (
                    flat.node.id(),
                    RowGeometry {
                        top,
                        center_y: top + 10.0,
                        bottom: top + 20.0,
                        left: 10.0 + flat.depth as f64 * 4.0,
                        width: 100.0,
                    },
                )
            })
            .collect()
    }

    fn list_of(parents: &[Option<TaskId>]) -> TaskList {
        let mut list = TaskList::default();
        for (i, parent) in parents.iter().enumerate() {
            add_task(&mut list, format!("t{}", i + 1), *parent, InsertPosition::Bottom, false)
                .unwrap();
        }
        list
    }

    fn order(list: &TaskList) -> Vec<TaskId> {
        list.visible.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_nearest_center_wins_and_x_picks_edge() {
        let list = list_of(&[None, None, None]);
        let geo = layout(&list);

        let t = resolve_drop_target(5.0, 33.0, &list, &geo).unwrap();
        assert_eq!(t.id, 2);
        assert_eq!(t.edge, MoveEdge::Sibling);
        assert_eq!(t.indicator_y, 40.0);

        let t = resolve_drop_target(50.0, 58.0, &list, &geo).unwrap();
        assert_eq!(t.id, 3);
        assert_eq!(t.edge, MoveEdge::Child);
    }

    #[test]
    fn test_pointer_exactly_on_left_edge_is_sibling() {
        let list = list_of(&[None]);
        let geo = layout(&list);
        let t = resolve_drop_target(10.0, 10.0, &list, &geo).unwrap();
        assert_eq!(t.edge, MoveEdge::Sibling);
    }

    #[test]
    fn test_ties_go_to_first_visible_row() {
        let list = list_of(&[None, None]);
        let geo = layout(&list);
        // Exactly between the centres at 10 and 30
        let t = resolve_drop_target(0.0, 20.0, &list, &geo).unwrap();
        assert_eq!(t.id, 1);
    }

    #[test]
    fn test_no_geometry_means_no_target() {
        let list = list_of(&[None]);
        let none = |_: TaskId| -> Option<RowGeometry> { None };
        assert_eq!(resolve_drop_target(0.0, 0.0, &list, &none), None);
    }

    #[test]
    fn test_drag_reorders_siblings() {
        let mut list = list_of(&[None, None, None]);
        let geo = layout(&list);
        let mut drag = DragSession::new();

        assert!(drag.start(1));
        drag.pointer_moved(0.0, 52.0, &list, &geo);
        let outcome = drag.finish(&mut list);

        assert_eq!(
            outcome,
            DragOutcome::Moved {
                task: 1,
                target: 3,
                edge: MoveEdge::Sibling
            }
        );
        assert_eq!(order(&list), vec![2, 3, 1]);
        assert!(!drag.is_active());
    }

    #[test]
    fn test_drag_right_of_title_makes_child() {
        let mut list = list_of(&[None, None]);
        let geo = layout(&list);
        let mut drag = DragSession::new();
        drag.start(2);
        drag.pointer_moved(40.0, 9.0, &list, &geo);
        drag.finish(&mut list);
        assert_eq!(list.visible_task(2).unwrap().parent, Some(1));
        assert!(list.visible_task(1).unwrap().expand);
    }

    #[test]
    fn test_drop_on_descendant_is_rejected() {
        let mut list = list_of(&[None, Some(1), Some(2)]);
        let geo = layout(&list);
        let before = list.clone();
        let mut drag = DragSession::new();
        drag.start(1);
        drag.pointer_moved(50.0, 50.0, &list, &geo);
        assert_eq!(drag.pending().map(|t| t.id), Some(3));

        let outcome = drag.finish(&mut list);
        assert_eq!(
            outcome,
            DragOutcome::Rejected(TaskError::InvalidMove { task: 1, target: 3 })
        );
        assert_eq!(list, before);
        assert!(!drag.is_active());
    }

    #[test]
    fn test_drop_on_itself_is_rejected() {
        let mut list = list_of(&[None, None]);
        let geo = layout(&list);
        let mut drag = DragSession::new();
        drag.start(2);
        drag.pointer_moved(0.0, 30.0, &list, &geo);
        assert!(matches!(drag.finish(&mut list), DragOutcome::Rejected(_)));
        assert_eq!(order(&list), vec![1, 2]);
    }

    #[test]
    fn test_release_without_movement_is_noop() {
        let mut list = list_of(&[None, None]);
        let before = list.clone();
        let mut drag = DragSession::new();
        drag.start(1);
        assert_eq!(drag.finish(&mut list), DragOutcome::NoTarget);
        assert_eq!(list, before);
        assert_eq!(drag.finish(&mut list), DragOutcome::NotDragging);
    }

    #[test]
    fn test_reentrant_start_is_ignored() {
        let mut drag = DragSession::new();
        assert!(drag.start(1));
        assert!(!drag.start(2));
        assert_eq!(drag.source(), Some(1));
    }

    #[test]
    fn test_pointer_moves_while_idle_are_ignored() {
        let list = list_of(&[None]);
        let geo = layout(&list);
        let mut drag = DragSession::new();
        assert_eq!(drag.pointer_moved(0.0, 0.0, &list, &geo), None);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_cancel_discards_pending_target() {
        let mut list = list_of(&[None, None]);
        let geo = layout(&list);
        let before = list.clone();
        let mut drag = DragSession::new();
        drag.start(1);
        drag.pointer_moved(0.0, 30.0, &list, &geo);
        assert!(drag.cancel());
        assert_eq!(drag.finish(&mut list), DragOutcome::NotDragging);
        assert_eq!(list, before);
        assert!(!drag.cancel());
    }

    #[test]
    fn test_hidden_rows_are_never_targets() {
        let mut list = list_of(&[None, Some(1), None]);
        toggle_expand(&mut list, 1, false).unwrap();
        let geo = layout(&list);
        assert!(!geo.contains_key(&2));
        let t = resolve_drop_target(0.0, 100.0, &list, &geo).unwrap();
        assert_eq!(t.id, 3);
    }
}
