use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use sqlx::{MySql, MySqlPool, QueryBuilder};

use super::{AttendanceStore, StoreError, StoreResult};
use crate::model::attendance::{AttendanceRecord, RecordFilter};
use crate::model::correction_request::{
    CorrectionRequest, NewCorrectionRequest, RequestFilter, RequestStatus,
};
use crate::model::user::{NewUser, User};

const USER_COLUMNS: &str = "id, username, password, full_name, email, role_id, created_at";

const RECORD_COLUMNS: &str = "id, user_id, date, clock_in, clock_out, break_start, break_end, \
     notes, status, admin_log, created_at, updated_at";

const REQUEST_COLUMNS: &str = "id, user_id, attendance_record_id, requested_date, \
     requested_clock_in, requested_clock_out, requested_break_start, requested_break_end, \
     requested_notes, reason, status, admin_notes, approved_by, created_at, updated_at";

/// MySQL reports every integrity violation as SQLSTATE 23000; only
/// duplicate keys are a uniqueness conflict, the rest stay database errors.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate;
        }
    }
    StoreError::Database(e)
}

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn write_record<'e, E>(executor: E, record: &AttendanceRecord) -> StoreResult<u64>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        if record.is_new() {
            let result = sqlx::query(
                r#"
                INSERT INTO attendance_records
                    (user_id, date, clock_in, clock_out, break_start, break_end,
                     notes, status, admin_log, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.user_id)
            .bind(record.date)
            .bind(record.clock_in)
            .bind(record.clock_out)
            .bind(record.break_start)
            .bind(record.break_end)
            .bind(&record.notes)
            .bind(&record.status)
            .bind(&record.admin_log)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(executor)
            .await
            .map_err(map_write_error)?;

            return Ok(result.last_insert_id());
        }

        sqlx::query(
            r#"
            UPDATE attendance_records
            SET clock_in = ?, clock_out = ?, break_start = ?, break_end = ?,
                notes = ?, status = ?, admin_log = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(record.clock_in)
        .bind(record.clock_out)
        .bind(record.break_start)
        .bind(record.break_end)
        .bind(&record.notes)
        .bind(&record.status)
        .bind(&record.admin_log)
        .bind(record.updated_at)
        .bind(record.id)
        .execute(executor)
        .await
        .map_err(map_write_error)?;

        // records are never deleted, and MySQL reports 0 affected rows for an
        // update that changes nothing, so the row count is not checked here
        Ok(record.id)
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let created_at = Local::now().naive_local();
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password, full_name, email, role_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.role_id)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(User {
            id: result.last_insert_id(),
            username: user.username,
            password: user.password,
            full_name: user.full_name,
            email: user.email,
            role_id: user.role_id,
            created_at,
        })
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_record(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql =
            format!("SELECT {RECORD_COLUMNS} FROM attendance_records WHERE user_id = ? AND date = ?");
        Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_record_by_id(&self, id: u64) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance_records WHERE id = ?");
        Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_records(&self, filter: &RecordFilter) -> StoreResult<Vec<AttendanceRecord>> {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE 1=1"
        ));
        if let Some(user_id) = filter.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND date <= ").push_bind(end);
        }
        qb.push(" ORDER BY date DESC, user_id");

        Ok(qb
            .build_query_as::<AttendanceRecord>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn save_record(&self, mut record: AttendanceRecord) -> StoreResult<AttendanceRecord> {
        record.id = Self::write_record(&self.pool, &record).await?;
        Ok(record)
    }

    async fn get_pending_request(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<CorrectionRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM correction_requests \
             WHERE user_id = ? AND requested_date = ? AND status = ?"
        );
        Ok(sqlx::query_as::<_, CorrectionRequest>(&sql)
            .bind(user_id)
            .bind(date)
            .bind(RequestStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_request(
        &self,
        request: NewCorrectionRequest,
    ) -> StoreResult<CorrectionRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO correction_requests
                (user_id, attendance_record_id, requested_date,
                 requested_clock_in, requested_clock_out,
                 requested_break_start, requested_break_end,
                 requested_notes, reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.user_id)
        .bind(request.attendance_record_id)
        .bind(request.requested_date)
        .bind(request.times.clock_in)
        .bind(request.times.clock_out)
        .bind(request.times.break_start)
        .bind(request.times.break_end)
        .bind(&request.requested_notes)
        .bind(&request.reason)
        .bind(RequestStatus::Pending.as_str())
        .bind(request.created_at)
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(CorrectionRequest {
            id: result.last_insert_id(),
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
        })
    }

    async fn get_request_by_id(&self, id: u64) -> StoreResult<Option<CorrectionRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM correction_requests WHERE id = ?");
        Ok(sqlx::query_as::<_, CorrectionRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<CorrectionRequest>> {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {REQUEST_COLUMNS} FROM correction_requests WHERE 1=1"
        ));
        if let Some(user_id) = filter.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY created_at DESC, id DESC");

        Ok(qb
            .build_query_as::<CorrectionRequest>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn commit_decision(
        &self,
        request: &CorrectionRequest,
        record: Option<AttendanceRecord>,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE correction_requests
            SET status = ?, admin_notes = ?, approved_by = ?, updated_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(request.status.as_str())
        .bind(&request.admin_notes)
        .bind(request.approved_by)
        .bind(request.updated_at)
        .bind(request.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls it back
            return Err(StoreError::Stale);
        }

        let saved = match record {
            Some(mut record) => {
                record.id = Self::write_record(&mut *tx, &record).await?;
                Some(record)
            }
            None => None,
        };

        tx.commit().await?;
        Ok(saved)
    }
}
