//! One function per user-visible action: lock the day, read, apply the
//! attendance rules, write.

use std::sync::Arc;
use std::time::Duration;

use crate::store::AttendanceStore;

pub mod attendance;
pub mod correction;
pub mod day_locks;
pub mod report;

use day_locks::DayLocks;

/// Shared handles passed to every operation.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AttendanceStore>,
    pub locks: DayLocks,
}

impl AppState {
    pub fn new(store: Arc<dyn AttendanceStore>, lock_idle: Duration) -> Self {
        Self {
            store,
            locks: DayLocks::new(lock_idle),
        }
    }
}

/// Who is acting, as established by the auth layer.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub user_id: u64,
    pub username: &'a str,
}
