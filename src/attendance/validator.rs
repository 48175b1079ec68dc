use crate::error::ValidationError;
use crate::model::attendance::DayTimes;

pub const CLOCK_OUT_BEFORE_CLOCK_IN: &str = "退勤時刻は出勤時刻より後である必要があります";
pub const BREAK_END_BEFORE_BREAK_START: &str = "休憩終了時刻は休憩開始時刻より後である必要があります";
pub const BREAK_START_BEFORE_CLOCK_IN: &str = "休憩開始時刻は出勤時刻より後である必要があります";
pub const BREAK_END_AFTER_CLOCK_OUT: &str = "休憩終了時刻は退勤時刻より前である必要があります";

/// Checks the ordering of a day's timestamps. The first violated rule wins.
///
/// All comparisons are strict, so zero-length shifts and breaks are rejected.
pub fn validate(times: &DayTimes) -> Result<(), ValidationError> {
    let DayTimes {
        clock_in,
        clock_out,
        break_start,
        break_end,
    } = *times;

    if let (Some(i), Some(o)) = (clock_in, clock_out) {
        if i >= o {
            return Err(ValidationError::InvalidTimeOrder(CLOCK_OUT_BEFORE_CLOCK_IN));
        }
    }

    if let (Some(bs), Some(be)) = (break_start, break_end) {
        if bs >= be {
            return Err(ValidationError::InvalidTimeOrder(BREAK_END_BEFORE_BREAK_START));
        }
    }

    if let (Some(bs), Some(i)) = (break_start, clock_in) {
        if bs <= i {
            return Err(ValidationError::InvalidTimeOrder(BREAK_START_BEFORE_CLOCK_IN));
        }
    }

    if let (Some(be), Some(o)) = (break_end, clock_out) {
        if be >= o {
            return Err(ValidationError::InvalidTimeOrder(BREAK_END_AFTER_CLOCK_OUT));
        }
    }

    Ok(())
}
