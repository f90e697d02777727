//! Attendance computation engine: schedule resolution, working-day calendar,
//! expected hours, the clock-in/out state machine, the stale-session reaper
//! and the report aggregator. Everything except the reaper's sweep is pure;
//! handlers pass entities and the current time in, decisions come out.

pub mod aggregate;
pub mod calendar;
pub mod clock;
pub mod expected;
pub mod reaper;
pub mod schedule;

use strum_macros::{Display, EnumString};

/// Why a clock action or report request was refused. Every variant is an
/// expected, caller-recoverable condition; none abort the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Rejection {
    /// User lacks a contract type or a complete daily schedule.
    NotConfigured,
    /// Clock-in attempted on a day outside the user's working days.
    NonWorkingDay,
    /// Clock-in attempted before the scheduled morning start.
    OutsideWindow,
    /// Action attempted at or after the scheduled end of day.
    PastEndOfDay,
    /// Clock-in while a session is already open.
    AlreadyOpen,
    /// Clock-out with no open session.
    NoOpenSession,
    /// Report requested without both ends of the date range.
    RangeRequired,
}
