use std::str::FromStr;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use super::AttendanceView;
use crate::attendance::time_input::local_now;
use crate::auth::auth::AuthUser;
use crate::error::{AppResult, ValidationError};
use crate::model::correction_request::{CorrectionRequest, RequestStatus};
use crate::service::correction::{CorrectionInput, Decision};
use crate::service::{self, AppState};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct RequestStatusQuery {
    /// pending, approved or rejected
    #[schema(example = "pending")]
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DecisionReq {
    /// approved or rejected
    #[schema(example = "approved")]
    pub status: String,
    pub admin_notes: Option<String>,
}

/// Submit a correction request for one of the caller's days
#[utoipa::path(
    post,
    path = "/api/correction-requests",
    request_body = CorrectionInput,
    responses(
        (status = 201, description = "Request filed as pending", body = CorrectionRequest),
        (status = 400, description = "Invalid times, missing reason or clock time"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Referenced record not found"),
        (status = 409, description = "A pending request already exists for that date")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Correction"
)]
pub async fn create_request(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CorrectionInput>,
) -> AppResult<HttpResponse> {
    let request =
        service::correction::create(&state, auth.user_id, payload.into_inner(), local_now())
            .await?;
    Ok(HttpResponse::Created().json(request))
}

/// The caller's own correction requests, newest first
#[utoipa::path(
    get,
    path = "/api/correction-requests",
    responses(
        (status = 200, description = "Own requests", body = [CorrectionRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Correction"
)]
pub async fn list_own(auth: AuthUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let requests = service::correction::list_own(&state, auth.user_id).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// All correction requests, optionally filtered by status (admin only)
#[utoipa::path(
    get,
    path = "/api/correction-requests/admin",
    params(RequestStatusQuery),
    responses(
        (status = 200, description = "Requests", body = [CorrectionRequest]),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Correction"
)]
pub async fn list_all(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<RequestStatusQuery>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(
            RequestStatus::from_str(s)
                .map_err(|_| ValidationError::InvalidDecision(s.to_string()))?,
        ),
    };

    let requests = service::correction::list_all(&state, status).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Approve or reject a pending request (admin only)
#[utoipa::path(
    put,
    path = "/api/correction-requests/{id}/decision",
    params(
        ("id" = u64, Path, description = "Correction request id")
    ),
    request_body = DecisionReq,
    responses(
        (status = 200, description = "Decision recorded", body = Object, example = json!({
            "message": "修正申請を承認しました",
            "request": { "id": 1, "status": "approved" },
            "record": { "id": 10, "state": "finished" }
        })),
        (status = 400, description = "Invalid status or resulting times"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Correction"
)]
pub async fn decide(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<DecisionReq>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let DecisionReq {
        status,
        admin_notes,
    } = payload.into_inner();
    let decision = Decision::parse(status.trim())?;

    let (request, record) = service::correction::decide(
        &state,
        auth.actor(),
        path.into_inner(),
        decision,
        admin_notes,
        local_now(),
    )
    .await?;

    let message = match decision {
        Decision::Approve => "修正申請を承認しました",
        Decision::Reject => "修正申請を却下しました",
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "request": request,
        "record": record.map(AttendanceView::from),
    })))
}
