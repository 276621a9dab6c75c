//! Apply-now, revert-on-failure cache cell.
//!
//! Mirrors the query cache entry of the remote preference resource: a write
//! is shown immediately, then either confirmed by the server or undone.

/// Lifecycle of the most recent optimistic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimisticState {
    /// No write since the value was last set from the server.
    Clean,
    /// A write is applied locally and awaiting acknowledgment.
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone)]
pub struct OptimisticCell<T> {
    value: T,
    prior: Option<T>,
    state: OptimisticState,
}

impl<T: Clone> OptimisticCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            prior: None,
            state: OptimisticState::Clean,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn state(&self) -> OptimisticState {
        self.state
    }

    /// Replace the value with server data, dropping any pending write.
    pub fn reset(&mut self, value: T) {
        self.value = value;
        self.prior = None;
        self.state = OptimisticState::Clean;
    }

    /// Show `next` immediately.
    ///
    /// When a write is already pending, the snapshot taken by that first write
    /// is kept, so a later rollback returns to the last confirmed value.
    pub fn apply(&mut self, next: T) {
        let previous = std::mem::replace(&mut self.value, next);
        if self.state != OptimisticState::Pending {
            self.prior = Some(previous);
        }
        self.state = OptimisticState::Pending;
    }

    /// Adopt the server-acknowledged value.
    pub fn commit(&mut self, acknowledged: T) {
        self.value = acknowledged;
        self.prior = None;
        self.state = OptimisticState::Committed;
    }

    /// Restore the snapshot captured by `apply`. No-op unless a write is pending.
    pub fn rollback(&mut self) {
        if self.state != OptimisticState::Pending {
            return;
        }
        if let Some(prior) = self.prior.take() {
            self.value = prior;
        }
        self.state = OptimisticState::RolledBack;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_then_commit() {
        let mut cell = OptimisticCell::new(1);
        assert_eq!(cell.state(), OptimisticState::Clean);

        cell.apply(2);
        assert_eq!(*cell.value(), 2);
        assert_eq!(cell.state(), OptimisticState::Pending);

        cell.commit(3);
        assert_eq!(*cell.value(), 3);
        assert_eq!(cell.state(), OptimisticState::Committed);
    }

    #[test]
    fn test_apply_then_rollback_restores_prior() {
        let mut cell = OptimisticCell::new("saved");

        cell.apply("draft");
        cell.rollback();

        assert_eq!(*cell.value(), "saved");
        assert_eq!(cell.state(), OptimisticState::RolledBack);
    }

    #[test]
    fn test_overlapping_writes_roll_back_to_first_snapshot() {
        let mut cell = OptimisticCell::new(10);

        cell.apply(11);
        cell.apply(12);
        cell.rollback();

        assert_eq!(*cell.value(), 10);
    }

    #[test]
    fn test_rollback_without_pending_is_noop() {
        let mut cell = OptimisticCell::new(5);
        cell.apply(6);
        cell.commit(6);

        cell.rollback();

        assert_eq!(*cell.value(), 6);
        assert_eq!(cell.state(), OptimisticState::Committed);
    }

    #[test]
    fn test_reset_discards_pending_write() {
        let mut cell = OptimisticCell::new(1);
        cell.apply(2);

        cell.reset(7);
        cell.rollback();

        assert_eq!(*cell.value(), 7);
        assert_eq!(cell.state(), OptimisticState::Clean);
    }
}
