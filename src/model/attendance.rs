use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status written on clock-in and on records created by corrections.
pub const STATUS_PRESENT: &str = "present";

/// The four timestamps of one working day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTimes {
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub break_start: Option<NaiveDateTime>,
    pub break_end: Option<NaiveDateTime>,
}

/// One user's attendance for one calendar date.
///
/// `id == 0` marks a record that has not been written yet; the store assigns
/// the real id on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-01-05T09:00:00", format = "date-time", value_type = Option<String>)]
    pub clock_in: Option<NaiveDateTime>,
    #[schema(example = "2026-01-05T18:00:00", format = "date-time", value_type = Option<String>)]
    pub clock_out: Option<NaiveDateTime>,
    #[schema(example = "2026-01-05T12:00:00", format = "date-time", value_type = Option<String>)]
    pub break_start: Option<NaiveDateTime>,
    #[schema(example = "2026-01-05T12:30:00", format = "date-time", value_type = Option<String>)]
    pub break_end: Option<NaiveDateTime>,
    pub notes: Option<String>,
    #[schema(example = "present")]
    pub status: String,
    /// newline separated audit entries, oldest first
    pub admin_log: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: NaiveDateTime,
}

impl AttendanceRecord {
    pub fn draft(user_id: u64, date: NaiveDate, now: NaiveDateTime) -> Self {
        Self {
            id: 0,
            user_id,
            date,
            clock_in: None,
            clock_out: None,
            break_start: None,
            break_end: None,
            notes: None,
            status: STATUS_PRESENT.to_string(),
            admin_log: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    pub fn times(&self) -> DayTimes {
        DayTimes {
            clock_in: self.clock_in,
            clock_out: self.clock_out,
            break_start: self.break_start,
            break_end: self.break_end,
        }
    }

    pub fn set_times(&mut self, times: DayTimes) {
        self.clock_in = times.clock_in;
        self.clock_out = times.clock_out;
        self.break_start = times.break_start;
        self.break_end = times.break_end;
    }
}

/// Filter for record listings; every bound is inclusive.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub user_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.user_id.is_none_or(|u| record.user_id == u)
            && self.start_date.is_none_or(|d| record.date >= d)
            && self.end_date.is_none_or(|d| record.date <= d)
    }
}
