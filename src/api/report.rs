use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::DateRangeQuery;
use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::attendance::RecordFilter;
use crate::service::report::AttendanceSummary;
use crate::service::{self, AppState};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    /// Inclusive lower bound, YYYY-MM-DD
    #[schema(example = "2026-01-01")]
    pub start_date: Option<String>,
    /// Inclusive upper bound, YYYY-MM-DD
    #[schema(example = "2026-01-31")]
    pub end_date: Option<String>,
    /// Restrict to one user
    #[schema(example = 1000)]
    pub user_id: Option<u64>,
}

/// Per-record work and break hours (admin only)
#[utoipa::path(
    get,
    path = "/api/reports/attendance-summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Summary", body = AttendanceSummary),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn attendance_summary(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<SummaryQuery>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let query = query.into_inner();
    let (start_date, end_date) = DateRangeQuery {
        start_date: query.start_date,
        end_date: query.end_date,
    }
    .parse()?;

    let filter = RecordFilter {
        user_id: query.user_id,
        start_date,
        end_date,
    };
    let summary = service::report::attendance_summary(&state, &filter).await?;
    Ok(HttpResponse::Ok().json(summary))
}
