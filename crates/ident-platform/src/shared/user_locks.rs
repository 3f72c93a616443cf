//! Per-user write serialisation.
//!
//! Every read-recompute-write of a user record (aggregate role type, MFA
//! sub-record, profile fields) runs while holding that user's lock, so two
//! concurrent binding mutations cannot both read the same stale aggregate.
//!
//! An entry lives only while someone holds or waits on it; the last guard
//! to go removes it.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

#[derive(Default)]
pub struct UserLocks {
    locks: Arc<LockMap>,
}

/// Removes the registry entry on drop unless another task still holds a
/// handle to the same mutex.
struct Slot {
    key: String,
    locks: Arc<LockMap>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

/// Held for the duration of one user mutation.
pub struct UserGuard {
    // Field order matters: the mutex handle is released before the slot
    // checks whether anyone else is left.
    _guard: OwnedMutexGuard<()>,
    _slot: Slot,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, domain_id: &str, user_id: &str) -> UserGuard {
        let key = format!("{}/{}", domain_id, user_id);
        let mutex = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // Declared before the await so a cancelled waiter still cleans up.
        let slot = Slot {
            key,
            locks: self.locks.clone(),
        };
        let guard = mutex.lock_owned().await;
        UserGuard {
            _guard: guard,
            _slot: slot,
        }
    }

    /// Users with a held or awaited lock.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_is_serialised() {
        let locks = Arc::new(UserLocks::new());
        let guard = locks.lock("d-1", "alice").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("d-1", "alice").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_users_do_not_block() {
        let locks = UserLocks::new();
        let _alice = locks.lock("d-1", "alice").await;
        let bob = tokio::time::timeout(Duration::from_millis(50), locks.lock("d-1", "bob")).await;
        assert!(bob.is_ok());
    }

    #[tokio::test]
    async fn test_released_entries_are_removed() {
        let locks = UserLocks::new();
        for i in 0..1000 {
            let _guard = locks.lock("d-1", &format!("user-{}", i)).await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_survives_until_last_waiter() {
        let locks = Arc::new(UserLocks::new());
        let guard = locks.lock("d-1", "alice").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("d-1", "alice").await;
                locks.len()
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(guard);
        assert_eq!(locks.len(), 1);
        assert_eq!(contender.await.unwrap(), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_waiter_leaves_nothing_behind() {
        let locks = UserLocks::new();
        let guard = locks.lock("d-1", "alice").await;

        let waiting = tokio::time::timeout(Duration::from_millis(10), locks.lock("d-1", "alice")).await;
        assert!(waiting.is_err());
        assert_eq!(locks.len(), 1);

        drop(guard);
        assert!(locks.is_empty());
    }
}
