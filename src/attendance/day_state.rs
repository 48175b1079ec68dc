use chrono::NaiveDateTime;
use serde::Deserialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::attendance::validator;
use crate::error::{AppError, ConflictError, ValidationError};
use crate::model::attendance::DayTimes;

pub const NO_CLOCK_IN: &str = "出勤記録がありません";
pub const NO_BREAK_START: &str = "休憩開始記録がありません";
pub const ALREADY_ON_BREAK: &str = "既に休憩中です";
pub const BREAK_ALREADY_TAKEN: &str = "本日の休憩は既に記録されています";
pub const DUPLICATE_BREAK_END: &str = "既に休憩終了記録があります";

/// Where a user is in their working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    NotStarted,
    Working { break_taken: bool },
    OnBreak,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, EnumString, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClockAction {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
}

impl DayState {
    pub fn of(times: &DayTimes) -> Self {
        match times {
            DayTimes { clock_in: None, .. } => DayState::NotStarted,
            DayTimes { clock_out: Some(_), .. } => DayState::Finished,
            DayTimes { break_start: Some(_), break_end: None, .. } => DayState::OnBreak,
            DayTimes { break_end, .. } => DayState::Working {
                break_taken: break_end.is_some(),
            },
        }
    }

    /// The wire name used in responses.
    pub fn label(self) -> &'static str {
        match self {
            DayState::NotStarted => "not_started",
            DayState::Working { .. } => "working",
            DayState::OnBreak => "on_break",
            DayState::Finished => "finished",
        }
    }
}

/// Applies one clock event at `now` and returns the new times.
///
/// The result has already passed the validator; on any error nothing about
/// `times` should be written back.
pub fn transition(
    times: &DayTimes,
    action: ClockAction,
    now: NaiveDateTime,
) -> Result<DayTimes, AppError> {
    let state = DayState::of(times);
    let mut next = *times;

    match (action, state) {
        (ClockAction::ClockIn, DayState::NotStarted) => next.clock_in = Some(now),
        (ClockAction::ClockIn, _) => return Err(ConflictError::DuplicateClockIn.into()),

        (ClockAction::ClockOut, DayState::NotStarted) => {
            return Err(ValidationError::MissingPrecedingEvent(NO_CLOCK_IN).into());
        }
        (ClockAction::ClockOut, DayState::Finished) => {
            return Err(ConflictError::DuplicateClockOut.into());
        }
        // leaving while on break keeps the break open
        (ClockAction::ClockOut, DayState::Working { .. } | DayState::OnBreak) => {
            next.clock_out = Some(now)
        }

        (ClockAction::BreakStart, DayState::NotStarted) => {
            return Err(ValidationError::MissingPrecedingEvent(NO_CLOCK_IN).into());
        }
        (ClockAction::BreakStart, DayState::OnBreak) => {
            return Err(ConflictError::DuplicateBreakEvent(ALREADY_ON_BREAK).into());
        }
        (ClockAction::BreakStart, DayState::Working { break_taken: true }) => {
            return Err(ConflictError::DuplicateBreakEvent(BREAK_ALREADY_TAKEN).into());
        }
        (ClockAction::BreakStart, DayState::Finished) => {
            return Err(ConflictError::DuplicateClockOut.into());
        }
        (ClockAction::BreakStart, DayState::Working { break_taken: false }) => {
            next.break_start = Some(now)
        }

        (ClockAction::BreakEnd, DayState::OnBreak) => next.break_end = Some(now),
        (ClockAction::BreakEnd, DayState::Finished) => {
            return Err(ConflictError::DuplicateClockOut.into());
        }
        (ClockAction::BreakEnd, _) if times.break_start.is_none() => {
            return Err(ValidationError::MissingPrecedingEvent(NO_BREAK_START).into());
        }
        (ClockAction::BreakEnd, _) => {
            return Err(ConflictError::DuplicateBreakEvent(DUPLICATE_BREAK_END).into());
        }
    }

    validator::validate(&next)?;
    Ok(next)
}

/// Checks times written wholesale (admin edits, approvals, requests): the
/// ordering rules first, then that the day is one clock events can continue.
pub fn check_times(times: &DayTimes) -> Result<(), ValidationError> {
    validator::validate(times)?;
    if times.break_end.is_some() && times.break_start.is_none() {
        return Err(ValidationError::MissingPrecedingEvent(NO_BREAK_START));
    }
    Ok(())
}
