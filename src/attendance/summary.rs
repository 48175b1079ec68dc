use chrono::TimeDelta;

use crate::model::attendance::DayTimes;

/// Worked and break time of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayDurations {
    pub work: TimeDelta,
    pub breaks: TimeDelta,
}

impl DayDurations {
    /// Work is counted only for a closed shift; the break is subtracted only
    /// when it is closed as well.
    pub fn of(times: &DayTimes) -> Self {
        let (Some(clock_in), Some(clock_out)) = (times.clock_in, times.clock_out) else {
            return Self::default();
        };

        let breaks = match (times.break_start, times.break_end) {
            (Some(s), Some(e)) => e - s,
            _ => TimeDelta::zero(),
        };

        Self {
            work: (clock_out - clock_in) - breaks,
            breaks,
        }
    }

    pub fn work_hours(&self) -> f64 {
        hours(self.work)
    }

    pub fn break_hours(&self) -> f64 {
        hours(self.breaks)
    }
}

/// Hours rounded to two decimals.
fn hours(d: TimeDelta) -> f64 {
    (d.num_seconds() as f64 / 3600.0 * 100.0).round() / 100.0
}
