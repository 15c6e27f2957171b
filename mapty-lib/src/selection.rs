// mapty-lib/src/selection.rs
use crate::workout::WorkoutId;
use log::debug;

/// The active workout and its position in the store's insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub id: WorkoutId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// A different workout became active; `previous` must be un-highlighted
    /// before `current` is drawn.
    Selected {
        previous: Option<Selection>,
        current: Selection,
    },
    /// The active workout was clicked again.
    Deselected { previous: Selection },
}

#[derive(Debug, Default)]
pub struct SelectionTracker {
    active: Option<Selection>,
}

impl SelectionTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    pub fn select(&mut self, id: WorkoutId, index: usize) -> SelectionChange {
        let change = match self.active {
            Some(previous) if previous.id == id => {
                self.active = None;
                SelectionChange::Deselected { previous }
            }
            previous => {
                let current = Selection { id, index };
                self.active = Some(current);
                SelectionChange::Selected { previous, current }
            }
        };
        debug!("Selection change: {change:?}");
        change
    }

    /// Moves the active selection to `index` after the rows before it changed.
    pub fn set_index(&mut self, index: usize) {
        if let Some(active) = self.active.as_mut() {
            active.index = index;
        }
    }

    pub fn clear(&mut self) -> Option<Selection> {
        self.active.take()
    }

    #[must_use]
    pub const fn active(&self) -> Option<Selection> {
        self.active
    }

    #[must_use]
    pub fn is_active(&self, id: WorkoutId) -> bool {
        self.active.is_some_and(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_click_toggles_off() {
        let mut tracker = SelectionTracker::new();
        let a = WorkoutId::new(1);

        let first = tracker.select(a, 0);
        assert_eq!(
            first,
            SelectionChange::Selected {
                previous: None,
                current: Selection { id: a, index: 0 }
            }
        );
        assert!(tracker.is_active(a));

        let second = tracker.select(a, 0);
        assert!(matches!(second, SelectionChange::Deselected { .. }));
        assert_eq!(tracker.active(), None);
    }

    #[test]
    fn switching_reports_previous() {
        let mut tracker = SelectionTracker::new();
        let (a, b) = (WorkoutId::new(1), WorkoutId::new(2));
        tracker.select(a, 0);

        match tracker.select(b, 1) {
            SelectionChange::Selected { previous, current } => {
                assert_eq!(previous.map(|p| p.id), Some(a));
                assert_eq!(current.id, b);
            }
            other => panic!("unexpected change {other:?}"),
        }
        assert!(!tracker.is_active(a));
        tracker.set_index(0);
        assert_eq!(tracker.active(), Some(Selection { id: b, index: 0 }));
        assert_eq!(tracker.clear().map(|s| s.id), Some(b));
        assert_eq!(tracker.active(), None);
    }
}
