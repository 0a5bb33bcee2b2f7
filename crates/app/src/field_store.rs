//! Observable per-field validation results.

use checkin_domain::{FormField, ValidationResult, ValidationState};
use std::sync::Arc;
use tokio::sync::watch;

/// Latest [`ValidationResult`] per field, with change notification.
///
/// Clones share the same slots. Subscribers are woken only when a write
/// actually changes the stored state, and always observe the most recent
/// snapshot (intermediate values may be skipped by slow readers).
#[derive(Debug, Clone)]
pub struct FieldResultStore {
    state: Arc<watch::Sender<ValidationState>>,
}

impl Default for FieldResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldResultStore {
    /// Store with no field validated.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(ValidationState::new());
        Self {
            state: Arc::new(sender),
        }
    }

    /// Current result for `field`.
    #[must_use]
    pub fn get(&self, field: FormField) -> Option<ValidationResult> {
        self.state.borrow().get(field).cloned()
    }

    /// Replace the result for `field`. Returns true if subscribers were notified.
    pub fn set(&self, field: FormField, result: ValidationResult) -> bool {
        self.state.send_if_modified(|state| state.set(field, result))
    }

    /// Copy of every field's result.
    #[must_use]
    pub fn snapshot(&self) -> ValidationState {
        self.state.borrow().clone()
    }

    /// Receiver that is marked changed on every effective write.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
        self.state.subscribe()
    }

    /// True when all four fields are `Valid`.
    #[must_use]
    pub fn is_form_valid(&self) -> bool {
        self.state.borrow().is_form_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_read_as_none() {
        let store = FieldResultStore::new();
        assert_eq!(store.get(FormField::Username), None);
        assert!(!store.is_form_valid());
    }

    #[test]
    fn clones_share_slots() {
        let store = FieldResultStore::new();
        let view = store.clone();
        assert!(store.set(FormField::Seat, ValidationResult::Valid));
        assert_eq!(view.get(FormField::Seat), Some(ValidationResult::Valid));
    }

    #[tokio::test]
    async fn subscribers_see_changes_but_not_repeats() {
        let store = FieldResultStore::new();
        let mut receiver = store.subscribe();

        assert!(store.set(FormField::Username, ValidationResult::Checking));
        assert!(receiver.has_changed().unwrap_or(false));
        assert_eq!(
            receiver.borrow_and_update().get(FormField::Username),
            Some(&ValidationResult::Checking)
        );

        assert!(!store.set(FormField::Username, ValidationResult::Checking));
        assert!(!receiver.has_changed().unwrap_or(true));
    }
}
