use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::attendance::DayTimes;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != RequestStatus::Pending
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CorrectionRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub user_id: u64,
    pub attendance_record_id: Option<u64>,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub requested_date: NaiveDate,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub requested_clock_in: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub requested_clock_out: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub requested_break_start: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub requested_break_end: Option<NaiveDateTime>,
    pub requested_notes: Option<String>,
    #[schema(example = "打刻忘れ")]
    pub reason: String,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    /// admin who decided the request, set for both outcomes
    pub approved_by: Option<u64>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: NaiveDateTime,
}

impl CorrectionRequest {
    pub fn requested_times(&self) -> DayTimes {
        DayTimes {
            clock_in: self.requested_clock_in,
            clock_out: self.requested_clock_out,
            break_start: self.requested_break_start,
            break_end: self.requested_break_end,
        }
    }
}

/// A validated request ready to be inserted with status `pending`.
#[derive(Debug, Clone)]
pub struct NewCorrectionRequest {
    pub user_id: u64,
    pub attendance_record_id: Option<u64>,
    pub requested_date: NaiveDate,
    pub times: DayTimes,
    pub requested_notes: Option<String>,
    pub reason: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub user_id: Option<u64>,
    pub status: Option<RequestStatus>,
}

impl RequestFilter {
    pub fn matches(&self, request: &CorrectionRequest) -> bool {
        self.user_id.is_none_or(|u| request.user_id == u)
            && self.status.is_none_or(|s| request.status == s)
    }
}
