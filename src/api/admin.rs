use actix_web::{HttpResponse, web};
use serde_json::json;

use super::AttendanceView;
use crate::attendance::time_input::local_now;
use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::user::UserProfile;
use crate::service::attendance::{DirectCorrection, NewRecordInput};
use crate::service::{self, AppState};

/// List all registered users (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Users", body = [UserProfile]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn list_users(auth: AuthUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let users = state.store.list_users().await?;
    let profiles: Vec<UserProfile> = users.iter().map(UserProfile::from).collect();
    Ok(HttpResponse::Ok().json(profiles))
}

/// Create the record of a day that has none yet (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/attendance",
    request_body = NewRecordInput,
    responses(
        (status = 201, description = "Record created", body = AttendanceView),
        (status = 400, description = "Invalid times"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found"),
        (status = 409, description = "A record already exists for that day")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn create_record(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewRecordInput>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let record = service::attendance::create_record(
        &state,
        auth.actor(),
        payload.into_inner(),
        local_now(),
    )
    .await?;
    Ok(HttpResponse::Created().json(AttendanceView::from(record)))
}

/// Correct a day directly, bypassing the request workflow (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/attendance/correct",
    request_body = DirectCorrection,
    responses(
        (status = 200, description = "Record corrected", body = Object, example = json!({
            "message": "勤怠記録を修正しました",
            "record": { "id": 10, "state": "finished" }
        })),
        (status = 400, description = "Invalid times"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn correct_record(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<DirectCorrection>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let record = service::attendance::direct_correct(
        &state,
        auth.actor(),
        payload.into_inner(),
        local_now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "勤怠記録を修正しました",
        "record": AttendanceView::from(record),
    })))
}
