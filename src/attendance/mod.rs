//! Attendance rules that do not touch storage.
//!
//! Every mutation path (clock events, direct admin correction, approved
//! correction requests) funnels through [`validator::validate`] before a
//! write, and derives the day's progress from [`day_state::DayState`].

pub mod audit_log;
pub mod day_state;
pub mod summary;
pub mod time_input;
pub mod validator;
