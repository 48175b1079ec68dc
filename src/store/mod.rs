//! Storage collaborator used by the attendance services.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::attendance::{AttendanceRecord, RecordFilter};
use crate::model::correction_request::{CorrectionRequest, NewCorrectionRequest, RequestFilter};
use crate::model::user::{NewUser, User};

pub mod memory;
pub mod mysql;

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated")]
    Duplicate,

    /// A conditional update matched no row.
    #[error("row changed concurrently")]
    Stale,

    /// A writer panicked while holding the in-memory tables.
    #[error("in-memory store lock poisoned")]
    Poisoned,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users, attendance records and correction requests.
///
/// Implementations must enforce one record per (user_id, date) and one
/// pending request per (user_id, requested_date), reporting violations as
/// [`StoreError::Duplicate`].
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn get_record(&self, user_id: u64, date: NaiveDate)
    -> StoreResult<Option<AttendanceRecord>>;

    async fn get_record_by_id(&self, id: u64) -> StoreResult<Option<AttendanceRecord>>;

    /// Newest date first.
    async fn list_records(&self, filter: &RecordFilter) -> StoreResult<Vec<AttendanceRecord>>;

    /// Inserts a draft (`id == 0`) or overwrites an existing record.
    async fn save_record(&self, record: AttendanceRecord) -> StoreResult<AttendanceRecord>;

    async fn get_pending_request(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<CorrectionRequest>>;

    async fn create_request(&self, request: NewCorrectionRequest)
    -> StoreResult<CorrectionRequest>;

    async fn get_request_by_id(&self, id: u64) -> StoreResult<Option<CorrectionRequest>>;

    /// Newest first.
    async fn list_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<CorrectionRequest>>;

    /// Atomically stores a decided request together with the record it
    /// produced, if any.
    ///
    /// The request is only written if it is still pending in storage,
    /// otherwise [`StoreError::Stale`] is returned and nothing is written.
    async fn commit_decision(
        &self,
        request: &CorrectionRequest,
        record: Option<AttendanceRecord>,
    ) -> StoreResult<Option<AttendanceRecord>>;
}
