use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::{Actor, AppState};
use crate::attendance::audit_log::{self, AuditEntry};
use crate::attendance::day_state::{self, ClockAction};
use crate::attendance::time_input::{parse_date, parse_optional_time_on};
use crate::error::{AppResult, ConflictError, NotFoundError};
use crate::model::attendance::{AttendanceRecord, DayTimes, RecordFilter, STATUS_PRESENT};
use crate::store::StoreError;

/// Admin edit of an existing or new day. Only fields that are present are
/// applied; times are `HH:MM` on `date`, and a blank time clears the field.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DirectCorrection {
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = "2026-01-05")]
    pub date: String,
    #[schema(example = "09:00")]
    pub clock_in: Option<String>,
    #[schema(example = "18:00")]
    pub clock_out: Option<String>,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    pub notes: Option<String>,
    #[schema(example = "打刻漏れのため")]
    pub reason: String,
}

/// Admin creation of a day that has no record yet. Blank times are left unset.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewRecordInput {
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = "2026-01-05")]
    pub date: String,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    pub notes: Option<String>,
    #[schema(example = "休日出勤の登録")]
    pub reason: String,
}

/// Checks `times` and writes them, together with the derived status, into
/// `record`. Used by every path that sets times wholesale.
pub(crate) fn apply_times(
    record: &mut AttendanceRecord,
    times: DayTimes,
    now: NaiveDateTime,
) -> AppResult<()> {
    day_state::check_times(&times)?;
    record.set_times(times);
    if times.clock_in.is_some() {
        record.status = STATUS_PRESENT.to_string();
    }
    record.updated_at = now;
    Ok(())
}

/// A record write that hit the (user, date) unique key means another writer
/// created the day first.
fn record_conflict(e: StoreError) -> crate::error::AppError {
    match e {
        StoreError::Duplicate => ConflictError::RecordAlreadyExists.into(),
        other => other.into(),
    }
}

async fn load_or_draft(
    state: &AppState,
    user_id: u64,
    date: NaiveDate,
    now: NaiveDateTime,
) -> AppResult<AttendanceRecord> {
    Ok(state
        .store
        .get_record(user_id, date)
        .await?
        .unwrap_or_else(|| AttendanceRecord::draft(user_id, date, now)))
}

/// Today's record, or an unsaved draft (`id == 0`) when nothing was recorded.
pub async fn today(state: &AppState, user_id: u64, now: NaiveDateTime) -> AppResult<AttendanceRecord> {
    load_or_draft(state, user_id, now.date(), now).await
}

pub async fn list_own(
    state: &AppState,
    user_id: u64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> AppResult<Vec<AttendanceRecord>> {
    let filter = RecordFilter {
        user_id: Some(user_id),
        start_date,
        end_date,
    };
    Ok(state.store.list_records(&filter).await?)
}

/// Records one clock event for `user_id` at `now`.
pub async fn clock(
    state: &AppState,
    user_id: u64,
    action: ClockAction,
    notes: Option<String>,
    now: NaiveDateTime,
) -> AppResult<AttendanceRecord> {
    let date = now.date();
    let _guard = state.locks.lock(user_id, date).await;

    let mut record = load_or_draft(state, user_id, date, now).await?;
    let times = day_state::transition(&record.times(), action, now)?;

    record.set_times(times);
    if action == ClockAction::ClockIn {
        record.status = STATUS_PRESENT.to_string();
    }
    if let Some(notes) = notes.filter(|n| !n.is_empty()) {
        record.notes = Some(notes);
    }
    record.updated_at = now;

    let saved = state.store.save_record(record).await.map_err(|e| match e {
        // lost a race on the very first event of the day
        StoreError::Duplicate if action == ClockAction::ClockIn => {
            ConflictError::DuplicateClockIn.into()
        }
        other => record_conflict(other),
    })?;

    info!(user_id, %date, %action, record_id = saved.id, "Attendance event recorded");
    Ok(saved)
}

/// Creates the record for a day that has none. Fails if one already exists.
pub async fn create_record(
    state: &AppState,
    admin: Actor<'_>,
    input: NewRecordInput,
    now: NaiveDateTime,
) -> AppResult<AttendanceRecord> {
    let date = parse_date(&input.date)?;
    if state.store.find_user(input.user_id).await?.is_none() {
        return Err(NotFoundError::UserNotFound.into());
    }

    let times = DayTimes {
        clock_in: parse_optional_time_on(date, input.clock_in.as_deref())?,
        clock_out: parse_optional_time_on(date, input.clock_out.as_deref())?,
        break_start: parse_optional_time_on(date, input.break_start.as_deref())?,
        break_end: parse_optional_time_on(date, input.break_end.as_deref())?,
    };

    let _guard = state.locks.lock(input.user_id, date).await;
    if state.store.get_record(input.user_id, date).await?.is_some() {
        return Err(ConflictError::RecordAlreadyExists.into());
    }

    let mut record = AttendanceRecord::draft(input.user_id, date, now);
    apply_times(&mut record, times, now)?;
    record.notes = input.notes;
    audit_log::append(
        &mut record,
        &AuditEntry {
            action: audit_log::ACTION_RECORD_CREATED,
            actor: admin.username,
            reason: &input.reason,
            request_id: None,
            at: now,
        },
    );

    let saved = state.store.save_record(record).await.map_err(record_conflict)?;
    info!(admin_id = admin.user_id, user_id = saved.user_id, %date, record_id = saved.id, "Attendance record created by admin");
    Ok(saved)
}

/// Applies an admin correction field by field, creating the day if needed.
pub async fn direct_correct(
    state: &AppState,
    admin: Actor<'_>,
    input: DirectCorrection,
    now: NaiveDateTime,
) -> AppResult<AttendanceRecord> {
    let date = parse_date(&input.date)?;
    if state.store.find_user(input.user_id).await?.is_none() {
        return Err(NotFoundError::UserNotFound.into());
    }

    // absent leaves the stored time alone; present but blank clears it
    let parse = |v: Option<&str>| {
        v.map(|s| parse_optional_time_on(date, Some(s))).transpose()
    };
    let clock_in = parse(input.clock_in.as_deref())?;
    let clock_out = parse(input.clock_out.as_deref())?;
    let break_start = parse(input.break_start.as_deref())?;
    let break_end = parse(input.break_end.as_deref())?;

    let _guard = state.locks.lock(input.user_id, date).await;
    let mut record = load_or_draft(state, input.user_id, date, now).await?;

    let current = record.times();
    let times = DayTimes {
        clock_in: clock_in.unwrap_or(current.clock_in),
        clock_out: clock_out.unwrap_or(current.clock_out),
        break_start: break_start.unwrap_or(current.break_start),
        break_end: break_end.unwrap_or(current.break_end),
    };
    apply_times(&mut record, times, now)?;
    if let Some(notes) = input.notes {
        record.notes = Some(notes);
    }
    audit_log::append(
        &mut record,
        &AuditEntry {
            action: audit_log::ACTION_DIRECT_CORRECTION,
            actor: admin.username,
            reason: &input.reason,
            request_id: None,
            at: now,
        },
    );

    let saved = state.store.save_record(record).await.map_err(record_conflict)?;
    info!(admin_id = admin.user_id, user_id = saved.user_id, %date, record_id = saved.id, "Attendance corrected by admin");
    Ok(saved)
}
