use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::attendance::apply_times;
use super::{Actor, AppState};
use crate::attendance::audit_log::{self, AuditEntry};
use crate::attendance::time_input::{parse_date, parse_optional_time_on};
use crate::attendance::day_state;
use crate::error::{AppError, AppResult, ConflictError, NotFoundError, ValidationError};
use crate::model::attendance::{AttendanceRecord, DayTimes};
use crate::model::correction_request::{
    CorrectionRequest, NewCorrectionRequest, RequestFilter, RequestStatus,
};
use crate::store::StoreError;

pub const CLOCK_TIME_REQUIRED: &str = "出勤時刻または退勤時刻のどちらかは入力してください";
pub const REASON_REQUIRED: &str = "申請理由を入力してください";

/// A user's proposal for a full day. Times are `HH:MM` on `requested_date`;
/// blank means "not set".
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CorrectionInput {
    pub attendance_record_id: Option<u64>,
    #[schema(example = "2026-01-05")]
    pub requested_date: String,
    #[schema(example = "09:00")]
    pub requested_clock_in: Option<String>,
    #[schema(example = "18:00")]
    pub requested_clock_out: Option<String>,
    #[schema(example = "12:00")]
    pub requested_break_start: Option<String>,
    #[schema(example = "13:00")]
    pub requested_break_end: Option<String>,
    pub requested_notes: Option<String>,
    #[schema(example = "出勤打刻を忘れたため")]
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Accepts the terminal status names used on the wire.
    pub fn parse(status: &str) -> Result<Self, ValidationError> {
        match status.parse::<RequestStatus>() {
            Ok(RequestStatus::Approved) => Ok(Decision::Approve),
            Ok(RequestStatus::Rejected) => Ok(Decision::Reject),
            _ => Err(ValidationError::InvalidDecision(status.to_string())),
        }
    }

    fn status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

/// Files a pending correction request for `user_id`.
pub async fn create(
    state: &AppState,
    user_id: u64,
    input: CorrectionInput,
    now: NaiveDateTime,
) -> AppResult<CorrectionRequest> {
    let date = parse_date(&input.requested_date)?;
    let _guard = state.locks.lock(user_id, date).await;

    if state.store.get_pending_request(user_id, date).await?.is_some() {
        return Err(ConflictError::DuplicatePendingRequest.into());
    }

    let reason = input.reason.trim();
    if reason.is_empty() {
        return Err(ValidationError::MissingRequiredField(REASON_REQUIRED).into());
    }

    let times = DayTimes {
        clock_in: parse_optional_time_on(date, input.requested_clock_in.as_deref())?,
        clock_out: parse_optional_time_on(date, input.requested_clock_out.as_deref())?,
        break_start: parse_optional_time_on(date, input.requested_break_start.as_deref())?,
        break_end: parse_optional_time_on(date, input.requested_break_end.as_deref())?,
    };
    if times.clock_in.is_none() && times.clock_out.is_none() {
        return Err(ValidationError::MissingRequiredField(CLOCK_TIME_REQUIRED).into());
    }
    day_state::check_times(&times)?;

    if let Some(record_id) = input.attendance_record_id {
        let record = state
            .store
            .get_record_by_id(record_id)
            .await?
            .filter(|r| r.user_id == user_id)
            .ok_or(NotFoundError::RecordNotFound)?;
        if record.date != date {
            return Err(ValidationError::RecordDateMismatch.into());
        }
    }

    let request = state
        .store
        .create_request(NewCorrectionRequest {
            user_id,
            attendance_record_id: input.attendance_record_id,
            requested_date: date,
            times,
            requested_notes: input.requested_notes,
            reason: reason.to_string(),
            created_at: now,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate => ConflictError::DuplicatePendingRequest.into(),
            other => AppError::from(other),
        })?;

    info!(user_id, %date, request_id = request.id, "Correction request created");
    Ok(request)
}

pub async fn list_own(state: &AppState, user_id: u64) -> AppResult<Vec<CorrectionRequest>> {
    let filter = RequestFilter {
        user_id: Some(user_id),
        status: None,
    };
    Ok(state.store.list_requests(&filter).await?)
}

pub async fn list_all(
    state: &AppState,
    status: Option<RequestStatus>,
) -> AppResult<Vec<CorrectionRequest>> {
    let filter = RequestFilter {
        user_id: None,
        status,
    };
    Ok(state.store.list_requests(&filter).await?)
}

/// Finds the record an approved request writes into, or drafts a new one.
async fn target_record(
    state: &AppState,
    request: &CorrectionRequest,
    now: NaiveDateTime,
) -> AppResult<AttendanceRecord> {
    if let Some(id) = request.attendance_record_id {
        if let Some(record) = state.store.get_record_by_id(id).await? {
            return Ok(record);
        }
    }

    Ok(state
        .store
        .get_record(request.user_id, request.requested_date)
        .await?
        .unwrap_or_else(|| AttendanceRecord::draft(request.user_id, request.requested_date, now)))
}

/// Approves or rejects a pending request. A request is decided exactly once.
///
/// Approval replaces all four times and the notes of the target record with
/// the request's values, including unset ones.
pub async fn decide(
    state: &AppState,
    admin: Actor<'_>,
    request_id: u64,
    decision: Decision,
    admin_notes: Option<String>,
    now: NaiveDateTime,
) -> AppResult<(CorrectionRequest, Option<AttendanceRecord>)> {
    let peek = state
        .store
        .get_request_by_id(request_id)
        .await?
        .ok_or(NotFoundError::RequestNotFound)?;

    let _guard = state.locks.lock(peek.user_id, peek.requested_date).await;

    // re-read under the lock so a concurrent decision is seen
    let mut request = state
        .store
        .get_request_by_id(request_id)
        .await?
        .ok_or(NotFoundError::RequestNotFound)?;
    if request.status.is_terminal() {
        return Err(ConflictError::AlreadyDecided.into());
    }

    request.status = decision.status();
    request.admin_notes = admin_notes;
    request.approved_by = Some(admin.user_id);
    request.updated_at = now;

    let record = match decision {
        Decision::Reject => None,
        Decision::Approve => {
            let mut record = target_record(state, &request, now).await?;
            apply_times(&mut record, request.requested_times(), now)?;
            record.notes = request.requested_notes.clone();
            audit_log::append(
                &mut record,
                &AuditEntry {
                    action: audit_log::ACTION_REQUEST_APPROVED,
                    actor: admin.username,
                    reason: &request.reason,
                    request_id: Some(request.id),
                    at: now,
                },
            );
            Some(record)
        }
    };

    let saved = state
        .store
        .commit_decision(&request, record)
        .await
        .map_err(|e| match e {
            StoreError::Stale => ConflictError::AlreadyDecided.into(),
            StoreError::Duplicate => ConflictError::RecordAlreadyExists.into(),
            other => AppError::from(other),
        })?;

    info!(
        admin_id = admin.user_id,
        request_id,
        status = %request.status,
        record_id = saved.as_ref().map(|r| r.id),
        "Correction request decided"
    );
    Ok((request, saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::day_state::ClockAction;
    use crate::model::user::NewUser;
    use crate::service::attendance;
    use crate::store::{AttendanceStore, InMemoryStore};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::time::Duration;

    const ADMIN: Actor<'static> = Actor { user_id: 1, username: "admin" };

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn later() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 7)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap()
    }

    async fn setup() -> (AppState, u64) {
        let store = Arc::new(InMemoryStore::new());
        let user = store
            .insert_user(NewUser {
                username: "sato".into(),
                password: "x".into(),
                full_name: "佐藤 花子".into(),
                email: "sato@example.com".into(),
                role_id: 2,
            })
            .await
            .unwrap();
        (AppState::new(store, Duration::from_secs(60)), user.id)
    }

    fn input(clock_in: Option<&str>, clock_out: Option<&str>) -> CorrectionInput {
        CorrectionInput {
            attendance_record_id: None,
            requested_date: "2026-01-05".into(),
            requested_clock_in: clock_in.map(String::from),
            requested_clock_out: clock_out.map(String::from),
            requested_break_start: None,
            requested_break_end: None,
            requested_notes: None,
            reason: "打刻忘れ".into(),
        }
    }

    #[actix_web::test]
    async fn one_pending_request_per_day() {
        let (state, user) = setup().await;

        let first = create(&state, user, input(Some("09:00"), None), later()).await.unwrap();
        assert_eq!(first.status, RequestStatus::Pending);
        assert_eq!(first.requested_clock_in, Some(at(9, 0)));
        assert_eq!(first.requested_clock_out, None);

        let err = create(&state, user, input(None, Some("18:00")), later()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ConflictError::DuplicatePendingRequest)));
    }

    #[actix_web::test]
    async fn rejects_invalid_proposals() {
        let (state, user) = setup().await;

        let err = create(&state, user, input(None, None), later()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingRequiredField(CLOCK_TIME_REQUIRED))
        ));

        let err = create(&state, user, input(Some("9:00am"), None), later()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::InvalidTimeFormat(_))));

        let err = create(&state, user, input(Some("18:00"), Some("09:00")), later())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::InvalidTimeOrder(_))));

        let mut blank_reason = input(Some("09:00"), None);
        blank_reason.reason = "  ".into();
        let err = create(&state, user, blank_reason, later()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingRequiredField(REASON_REQUIRED))
        ));

        assert!(list_own(&state, user).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn target_record_must_belong_to_requester() {
        let (state, user) = setup().await;
        let record = attendance::clock(&state, user, ClockAction::ClockIn, None, at(9, 0))
            .await
            .unwrap();

        let mut other_users = input(Some("09:00"), None);
        other_users.attendance_record_id = Some(record.id);
        let err = create(&state, user + 1, other_users, later()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(NotFoundError::RecordNotFound)));

        let mut wrong_day = input(Some("09:00"), None);
        wrong_day.attendance_record_id = Some(record.id);
        wrong_day.requested_date = "2026-01-06".into();
        let err = create(&state, user, wrong_day, later()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::RecordDateMismatch)));
    }

    #[actix_web::test]
    async fn approval_creates_missing_record_with_one_log_entry() {
        let (state, user) = setup().await;
        let mut proposal = input(Some("09:00"), Some("18:00"));
        proposal.requested_break_start = Some("12:00".into());
        proposal.requested_break_end = Some("12:30".into());
        proposal.requested_notes = Some("客先直行".into());
        let req = create(&state, user, proposal, later()).await.unwrap();

        let (decided, record) =
            decide(&state, ADMIN, req.id, Decision::Approve, Some("OK".into()), later())
                .await
                .unwrap();
        let record = record.unwrap();

        assert_eq!(decided.status, RequestStatus::Approved);
        assert_eq!(decided.approved_by, Some(ADMIN.user_id));
        assert_eq!(decided.admin_notes.as_deref(), Some("OK"));
        assert_eq!(record.user_id, user);
        assert_eq!(record.date, day());
        assert_eq!(record.times(), req.requested_times());
        assert_eq!(record.notes.as_deref(), Some("客先直行"));

        let log = record.admin_log.unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains(&format!("[申請ID: {}]", req.id)));

        let stored = state.store.get_record(user, day()).await.unwrap().unwrap();
        assert_eq!(stored.id, record.id);
    }

    #[actix_web::test]
    async fn approval_overwrites_every_field() {
        let (state, user) = setup().await;
        for (action, t) in [
            (ClockAction::ClockIn, at(9, 0)),
            (ClockAction::BreakStart, at(12, 0)),
            (ClockAction::BreakEnd, at(12, 30)),
            (ClockAction::ClockOut, at(18, 0)),
        ] {
            attendance::clock(&state, user, action, Some("元の備考".into()), t).await.unwrap();
        }
        let existing = state.store.get_record(user, day()).await.unwrap().unwrap();

        let mut proposal = input(Some("08:30"), None);
        proposal.attendance_record_id = Some(existing.id);
        let req = create(&state, user, proposal, later()).await.unwrap();

        let (_, record) = decide(&state, ADMIN, req.id, Decision::Approve, None, later())
            .await
            .unwrap();
        let record = record.unwrap();

        assert_eq!(record.id, existing.id);
        assert_eq!(record.clock_in, Some(at(8, 30)));
        assert_eq!(record.clock_out, None);
        assert_eq!(record.break_start, None);
        assert_eq!(record.break_end, None);
        assert_eq!(record.notes, None);
    }

    #[actix_web::test]
    async fn rejection_leaves_attendance_alone() {
        let (state, user) = setup().await;
        let req = create(&state, user, input(Some("09:00"), None), later()).await.unwrap();

        let (decided, record) =
            decide(&state, ADMIN, req.id, Decision::Reject, Some("根拠なし".into()), later())
                .await
                .unwrap();
        assert_eq!(decided.status, RequestStatus::Rejected);
        assert!(record.is_none());
        assert!(state.store.get_record(user, day()).await.unwrap().is_none());

        // the day is free for a new request
        create(&state, user, input(Some("09:10"), None), later()).await.unwrap();
    }

    #[actix_web::test]
    async fn decided_request_cannot_be_decided_again() {
        let (state, user) = setup().await;
        let req = create(&state, user, input(Some("09:00"), None), later()).await.unwrap();
        decide(&state, ADMIN, req.id, Decision::Reject, None, later()).await.unwrap();

        for decision in [Decision::Approve, Decision::Reject] {
            let err = decide(&state, ADMIN, req.id, decision, None, later()).await.unwrap_err();
            assert!(matches!(err, AppError::Conflict(ConflictError::AlreadyDecided)));
        }

        let stored = state.store.get_request_by_id(req.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Rejected);
        assert!(state.store.get_record(user, day()).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn unknown_request_is_not_found() {
        let (state, _) = setup().await;
        let err = decide(&state, ADMIN, 42, Decision::Approve, None, later()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(NotFoundError::RequestNotFound)));
    }

    #[test]
    fn parses_decisions() {
        assert_eq!(Decision::parse("approved"), Ok(Decision::Approve));
        assert_eq!(Decision::parse("rejected"), Ok(Decision::Reject));
        assert!(Decision::parse("pending").is_err());
        assert!(Decision::parse("maybe").is_err());
    }

    #[actix_web::test]
    async fn admin_listing_filters_by_status() {
        let (state, user) = setup().await;
        let a = create(&state, user, input(Some("09:00"), None), later()).await.unwrap();
        decide(&state, ADMIN, a.id, Decision::Approve, None, later()).await.unwrap();
        create(&state, user, input(Some("09:05"), None), later()).await.unwrap();

        assert_eq!(list_all(&state, None).await.unwrap().len(), 2);
        let pending = list_all(&state, Some(RequestStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].requested_clock_in, Some(at(9, 5)));
    }

    #[actix_web::test]
    async fn concurrent_requests_for_one_day_file_once() {
        let (state, user) = setup().await;

        let (a, b) = futures::join!(
            create(&state, user, input(Some("09:00"), None), later()),
            create(&state, user, input(None, Some("18:00")), later()),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(AppError::Conflict(ConflictError::DuplicatePendingRequest))
        )));
        assert_eq!(list_own(&state, user).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn break_end_alone_is_not_a_valid_proposal() {
        let (state, user) = setup().await;
        let proposal = CorrectionInput {
            requested_break_end: Some("13:00".into()),
            ..input(Some("09:00"), Some("18:00"))
        };

        let err = create(&state, user, proposal, later()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingPrecedingEvent(_))
        ));
    }
}
