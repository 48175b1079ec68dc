use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use super::AppState;
use crate::attendance::summary::DayDurations;
use crate::error::AppResult;
use crate::model::attendance::RecordFilter;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SummaryRow {
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub clock_in: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub clock_out: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub break_start: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub break_end: Option<NaiveDateTime>,
    #[schema(example = 8.5)]
    pub work_hours: f64,
    #[schema(example = 0.5)]
    pub break_hours: f64,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub summary: Vec<SummaryRow>,
    pub total_records: usize,
}

pub async fn attendance_summary(
    state: &AppState,
    filter: &RecordFilter,
) -> AppResult<AttendanceSummary> {
    let records = state.store.list_records(filter).await?;

    let summary: Vec<SummaryRow> = records
        .into_iter()
        .map(|r| {
            let durations = DayDurations::of(&r.times());
            SummaryRow {
                user_id: r.user_id,
                date: r.date,
                clock_in: r.clock_in,
                clock_out: r.clock_out,
                break_start: r.break_start,
                break_end: r.break_end,
                work_hours: durations.work_hours(),
                break_hours: durations.break_hours(),
                status: r.status,
                notes: r.notes,
            }
        })
        .collect();

    Ok(AttendanceSummary {
        total_records: summary.len(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::day_state::ClockAction;
    use crate::service::attendance::clock;
    use crate::store::InMemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, d)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    #[actix_web::test]
    async fn summarises_hours_per_record() {
        let state = AppState::new(Arc::new(InMemoryStore::new()), Duration::from_secs(60));
        for (action, t) in [
            (ClockAction::ClockIn, at(5, 9, 0)),
            (ClockAction::BreakStart, at(5, 12, 0)),
            (ClockAction::BreakEnd, at(5, 12, 30)),
            (ClockAction::ClockOut, at(5, 18, 0)),
        ] {
            clock(&state, 7, action, None, t).await.unwrap();
        }
        clock(&state, 7, ClockAction::ClockIn, None, at(6, 9, 0)).await.unwrap();
        clock(&state, 8, ClockAction::ClockIn, None, at(6, 10, 0)).await.unwrap();

        let all = attendance_summary(&state, &RecordFilter::default()).await.unwrap();
        assert_eq!(all.total_records, 3);

        let filter = RecordFilter {
            user_id: Some(7),
            start_date: Some(at(5, 0, 0).date()),
            end_date: Some(at(5, 0, 0).date()),
        };
        let one = attendance_summary(&state, &filter).await.unwrap();
        assert_eq!(one.total_records, 1);
        assert_eq!(one.summary[0].work_hours, 8.5);
        assert_eq!(one.summary[0].break_hours, 0.5);
    }
}
