use std::str::FromStr;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use super::{AttendanceView, DateRangeQuery};
use crate::attendance::day_state::ClockAction;
use crate::attendance::time_input::local_now;
use crate::auth::auth::AuthUser;
use crate::error::{AppResult, ValidationError};
use crate::service::{self, AppState};

#[derive(Deserialize, ToSchema)]
pub struct ClockReq {
    /// clock_in, clock_out, break_start or break_end
    #[schema(example = "clock_in")]
    pub action: String,
    pub notes: Option<String>,
}

fn recorded_message(action: ClockAction) -> &'static str {
    match action {
        ClockAction::ClockIn => "出勤を記録しました",
        ClockAction::ClockOut => "退勤を記録しました",
        ClockAction::BreakStart => "休憩開始を記録しました",
        ClockAction::BreakEnd => "休憩終了を記録しました",
    }
}

/// List the caller's own attendance records, newest first
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Own attendance records", body = [AttendanceView]),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<DateRangeQuery>,
) -> AppResult<HttpResponse> {
    let (start_date, end_date) = query.parse()?;
    let records =
        service::attendance::list_own(&state, auth.user_id, start_date, end_date).await?;
    let views: Vec<AttendanceView> = records.into_iter().map(AttendanceView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

/// Today's attendance for the caller
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's record; id 0 when nothing is recorded yet", body = AttendanceView),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(auth: AuthUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let record = service::attendance::today(&state, auth.user_id, local_now()).await?;
    Ok(HttpResponse::Ok().json(AttendanceView::from(record)))
}

/// Record a clock event at the current server time
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = ClockReq,
    responses(
        (status = 200, description = "Event recorded", body = Object, example = json!({
            "message": "出勤を記録しました",
            "record": { "id": 1, "state": "working" }
        })),
        (status = 400, description = "Unknown action or missing preceding event"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Event already recorded today")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ClockReq>,
) -> AppResult<HttpResponse> {
    let ClockReq { action, notes } = payload.into_inner();
    let action = ClockAction::from_str(action.trim())
        .map_err(|_| ValidationError::InvalidAction(action.clone()))?;

    let record =
        service::attendance::clock(&state, auth.user_id, action, notes, local_now()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": recorded_message(action),
        "record": AttendanceView::from(record),
    })))
}
