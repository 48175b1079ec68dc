pub mod admin;
pub mod attendance;
pub mod correction;
pub mod report;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::attendance::day_state::DayState;
use crate::attendance::time_input::parse_date;
use crate::error::ValidationError;
use crate::model::attendance::AttendanceRecord;

/// Status shown for a day that has no stored record yet.
pub const STATUS_NOT_CLOCKED_IN: &str = "not_clocked_in";

/// A record as returned to clients, with the derived day state.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceView {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    /// not_started, working, on_break or finished
    #[schema(example = "working", value_type = String)]
    pub state: &'static str,
}

impl From<AttendanceRecord> for AttendanceView {
    fn from(mut record: AttendanceRecord) -> Self {
        let state = DayState::of(&record.times()).label();
        if record.is_new() {
            record.status = STATUS_NOT_CLOCKED_IN.to_string();
        }
        Self { record, state }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct DateRangeQuery {
    /// Inclusive lower bound, YYYY-MM-DD
    #[schema(example = "2026-01-01")]
    pub start_date: Option<String>,
    /// Inclusive upper bound, YYYY-MM-DD
    #[schema(example = "2026-01-31")]
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    pub fn parse(&self) -> Result<(Option<chrono::NaiveDate>, Option<chrono::NaiveDate>), ValidationError> {
        let parse = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(parse_date)
                .transpose()
        };
        Ok((parse(&self.start_date)?, parse(&self.end_date)?))
    }
}
