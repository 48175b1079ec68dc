use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serialises read-validate-write sequences on one (user, date).
///
/// Locks are created on demand and evicted once idle; storage uniqueness
/// constraints still catch writers in other processes.
#[derive(Clone)]
pub struct DayLocks {
    locks: Cache<(u64, NaiveDate), Arc<Mutex<()>>>,
}

impl DayLocks {
    pub fn new(idle: Duration) -> Self {
        Self {
            locks: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(idle)
                .build(),
        }
    }

    pub async fn lock(&self, user_id: u64, date: NaiveDate) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with((user_id, date), async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}
