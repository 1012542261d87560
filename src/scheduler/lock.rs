//! Run-lock registry for in-flight calendar rebuilds.
//!
//! A rebuild wipes and re-creates a whole user/year calendar, so two of them
//! running concurrently for the same key would interleave deletes and
//! inserts. The registry hands out at most one permit per (user, year).

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::UserId;

/// Process-wide registry of in-flight rebuilds keyed by (user, year).
///
/// Clones share the same underlying set, so every scheduler touching the
/// same store should hold a clone of one registry.
#[derive(Clone, Default)]
pub struct RunLockRegistry {
    held: Arc<Mutex<HashSet<(UserId, i32)>>>,
}

impl RunLockRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the (user, year) slot.
    ///
    /// Returns `None` when a rebuild for the same key is already in flight.
    /// The returned permit releases the slot on drop.
    pub fn try_acquire(&self, user_id: UserId, year: i32) -> Option<RunPermit> {
        let mut held = self.held.lock();
        if held.insert((user_id, year)) {
            Some(RunPermit {
                registry: Arc::clone(&self.held),
                key: (user_id, year),
            })
        } else {
            None
        }
    }

    /// Whether a rebuild for (user, year) is currently in flight.
    pub fn is_held(&self, user_id: UserId, year: i32) -> bool {
        self.held.lock().contains(&(user_id, year))
    }
}

/// RAII guard for one in-flight rebuild slot.
pub struct RunPermit {
    registry: Arc<Mutex<HashSet<(UserId, i32)>>>,
    key: (UserId, i32),
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_for_same_key_is_refused() {
        let registry = RunLockRegistry::new();
        let permit = registry.try_acquire(UserId(1), 2026);
        assert!(permit.is_some());
        assert!(registry.is_held(UserId(1), 2026));
        assert!(registry.try_acquire(UserId(1), 2026).is_none());
    }

    #[test]
    fn test_dropping_the_permit_releases_the_slot() {
        let registry = RunLockRegistry::new();
        let permit = registry.try_acquire(UserId(1), 2026);
        drop(permit);
        assert!(!registry.is_held(UserId(1), 2026));
        assert!(registry.try_acquire(UserId(1), 2026).is_some());
    }

    #[test]
    fn test_different_keys_do_not_contend() {
        let registry = RunLockRegistry::new();
        let _a = registry.try_acquire(UserId(1), 2026);
        assert!(registry.try_acquire(UserId(1), 2027).is_some());
        assert!(registry.try_acquire(UserId(2), 2026).is_some());
    }

    #[test]
    fn test_clones_share_the_same_slots() {
        let registry = RunLockRegistry::new();
        let clone = registry.clone();
        let _permit = registry.try_acquire(UserId(1), 2026);
        assert!(clone.try_acquire(UserId(1), 2026).is_none());
    }
}
