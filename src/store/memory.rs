use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};

use super::{AttendanceStore, StoreError, StoreResult};
use crate::model::attendance::{AttendanceRecord, RecordFilter};
use crate::model::correction_request::{
    CorrectionRequest, NewCorrectionRequest, RequestFilter, RequestStatus,
};
use crate::model::user::{NewUser, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<u64, User>,
    records: BTreeMap<u64, AttendanceRecord>,
    requests: BTreeMap<u64, CorrectionRequest>,
    next_user_id: u64,
    next_record_id: u64,
    next_request_id: u64,
}

impl Tables {
    fn record_taken(&self, record: &AttendanceRecord) -> bool {
        self.records
            .values()
            .any(|r| r.id != record.id && r.user_id == record.user_id && r.date == record.date)
    }

    fn put_record(&mut self, mut record: AttendanceRecord) -> StoreResult<AttendanceRecord> {
        if self.record_taken(&record) {
            return Err(StoreError::Duplicate);
        }
        if record.is_new() {
            self.next_record_id += 1;
            record.id = self.next_record_id;
        } else if !self.records.contains_key(&record.id) {
            return Err(StoreError::Stale);
        }
        self.records.insert(record.id, record.clone());
        Ok(record)
    }
}

/// Process-local store with the same uniqueness rules as the MySQL schema.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<User>> {
        Ok(self.tables()?.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables()?;
        if t.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate);
        }
        t.next_user_id += 1;
        let row = User {
            id: t.next_user_id,
            username: user.username,
            password: user.password,
            full_name: user.full_name,
            email: user.email,
            role_id: user.role_id,
            created_at: Local::now().naive_local(),
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables()?.users.values().cloned().collect())
    }

    async fn get_record(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self
            .tables()?
            .records
            .values()
            .find(|r| r.user_id == user_id && r.date == date)
            .cloned())
    }

    async fn get_record_by_id(&self, id: u64) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self.tables()?.records.get(&id).cloned())
    }

    async fn list_records(&self, filter: &RecordFilter) -> StoreResult<Vec<AttendanceRecord>> {
        let mut rows: Vec<_> = self
            .tables()?
            .records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(a.user_id.cmp(&b.user_id)));
        Ok(rows)
    }

    async fn save_record(&self, record: AttendanceRecord) -> StoreResult<AttendanceRecord> {
        self.tables()?.put_record(record)
    }

    async fn get_pending_request(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<CorrectionRequest>> {
        Ok(self
            .tables()?
            .requests
            .values()
            .find(|r| {
                r.user_id == user_id
                    && r.requested_date == date
                    && r.status == RequestStatus::Pending
            })
            .cloned())
    }

    async fn create_request(
        &self,
        request: NewCorrectionRequest,
    ) -> StoreResult<CorrectionRequest> {
        let mut t = self.tables()?;
        let duplicate = t.requests.values().any(|r| {
            r.user_id == request.user_id
                && r.requested_date == request.requested_date
                && r.status == RequestStatus::Pending
        });
        if duplicate {
            return Err(StoreError::Duplicate);
        }

        t.next_request_id += 1;
        let row = CorrectionRequest {
            id: t.next_request_id,
            user_id: request.user_id,
            attendance_record_id: request.attendance_record_id,
            requested_date: request.requested_date,
            requested_clock_in: request.times.clock_in,
            requested_clock_out: request.times.clock_out,
            requested_break_start: request.times.break_start,
            requested_break_end: request.times.break_end,
            requested_notes: request.requested_notes,
            reason: request.reason,
            status: RequestStatus::Pending,
            admin_notes: None,
            approved_by: None,
            created_at: request.created_at,
            updated_at: request.created_at,
        };
        t.requests.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_request_by_id(&self, id: u64) -> StoreResult<Option<CorrectionRequest>> {
        Ok(self.tables()?.requests.get(&id).cloned())
    }

    async fn list_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<CorrectionRequest>> {
        let mut rows: Vec<_> = self
            .tables()?
            .requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn commit_decision(
        &self,
        request: &CorrectionRequest,
        record: Option<AttendanceRecord>,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let mut t = self.tables()?;
        let still_pending = t
            .requests
            .get(&request.id)
            .is_some_and(|r| r.status == RequestStatus::Pending);
        if !still_pending {
            return Err(StoreError::Stale);
        }

        // write the record first so a failure leaves the request pending
        let saved = record.map(|r| t.put_record(r)).transpose()?;
        t.requests.insert(request.id, request.clone());
        Ok(saved)
    }
}
