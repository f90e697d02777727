use chrono::{Duration, NaiveDateTime};

use crate::engine::Rejection;
use crate::engine::calendar::is_working_day;
use crate::engine::schedule::resolve_schedule;
use crate::model::clock_record::ClockRecord;
use crate::model::user::User;

/// Outcome of an accepted clock-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockInGrant {
    pub late_minutes: i64,
}

/// Outcome of an accepted clock-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockOutGrant {
    pub worked_minutes: i64,
}

/// Decide a clock-in at `now`. Callers must run the stale-session reaper for
/// this user first, so `has_open` reflects only genuinely live sessions.
///
/// Lateness is measured from the end of the grace window, not the scheduled
/// start: at `am_start + grace` exactly the grant is on time. A clock-in
/// inside the afternoon grace window is measured against `pm_start`
/// (afternoon wins when both could apply); everything else is measured
/// against `am_start`, so an afternoon-only arrival carries the missed
/// morning as lateness. `exempt` skips the calendar and timing checks and
/// grants 0 lateness.
pub fn evaluate_clock_in(
    user: &User,
    has_open: bool,
    now: NaiveDateTime,
    exempt: bool,
) -> Result<ClockInGrant, Rejection> {
    if has_open {
        return Err(Rejection::AlreadyOpen);
    }
    if !user.has_contract() || !user.has_schedule() {
        return Err(Rejection::NotConfigured);
    }
    if exempt {
        return Ok(ClockInGrant { late_minutes: 0 });
    }

    let today = now.date();
    if !is_working_day(user, today) {
        return Err(Rejection::NonWorkingDay);
    }

    let s = resolve_schedule(user);
    let am_start = today.and_time(s.am_start);
    let pm_start = today.and_time(s.pm_start);
    let pm_end = today.and_time(s.pm_end);
    let grace = Duration::minutes(s.grace_min);

    if now >= pm_end {
        return Err(Rejection::PastEndOfDay);
    }
    if now < am_start {
        return Err(Rejection::OutsideWindow);
    }

    let in_afternoon_window = now >= pm_start && now <= pm_start + grace;
    let anchor = if in_afternoon_window { pm_start } else { am_start };
    let late_minutes = (now - (anchor + grace)).num_minutes().max(0);

    Ok(ClockInGrant { late_minutes })
}

/// Decide a clock-out at `now` against the open record, if any. Worked time
/// is the whole elapsed minutes since clock-in; a midday gap the user never
/// clocked out for is counted as worked.
pub fn evaluate_clock_out(
    user: &User,
    open: Option<&ClockRecord>,
    now: NaiveDateTime,
    exempt: bool,
) -> Result<ClockOutGrant, Rejection> {
    let Some(record) = open.filter(|r| r.is_open()) else {
        return Err(Rejection::NoOpenSession);
    };

    if !exempt {
        let s = resolve_schedule(user);
        if now >= s.end_of_day(record.date) {
            return Err(Rejection::PastEndOfDay);
        }
    }

    Ok(ClockOutGrant {
        worked_minutes: (now - record.clock_in_at).num_minutes().max(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::clock_record::ClockSource;
    use crate::model::user::fixtures::{tracked_user, untracked_user};
    use chrono::NaiveDate;

    fn monday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn open_record(clock_in_at: NaiveDateTime) -> ClockRecord {
        ClockRecord {
            id: 7,
            user_id: 1,
            date: clock_in_at.date(),
            clock_in_at,
            clock_out_at: None,
            late_minutes: 0,
            worked_minutes: 0,
            source: ClockSource::Manual.to_string(),
        }
    }

    #[test]
    fn on_time_inside_grace() {
        let grant = evaluate_clock_in(&tracked_user(1), false, monday_at(9, 10), false).unwrap();
        assert_eq!(grant.late_minutes, 0);
    }

    #[test]
    fn grace_boundary_is_exact() {
        let user = tracked_user(1);
        // at am_start + grace exactly: still on time
        let grant = evaluate_clock_in(&user, false, monday_at(9, 15), false).unwrap();
        assert_eq!(grant.late_minutes, 0);
        // one minute past grace: one minute late
        let grant = evaluate_clock_in(&user, false, monday_at(9, 16), false).unwrap();
        assert_eq!(grant.late_minutes, 1);
    }

    #[test]
    fn before_morning_start_is_outside_window() {
        let err = evaluate_clock_in(&tracked_user(1), false, monday_at(8, 40), false).unwrap_err();
        assert_eq!(err, Rejection::OutsideWindow);
    }

    #[test]
    fn afternoon_grace_window_anchors_on_pm_start() {
        let user = tracked_user(1);
        let grant = evaluate_clock_in(&user, false, monday_at(13, 40), false).unwrap();
        assert_eq!(grant.late_minutes, 0);
        // past the afternoon grace the anchor reverts to the morning start
        let grant = evaluate_clock_in(&user, false, monday_at(13, 50), false).unwrap();
        assert_eq!(grant.late_minutes, (13 * 60 + 50) - (9 * 60 + 15));
    }

    #[test]
    fn at_or_after_day_end_is_rejected() {
        let user = tracked_user(1);
        assert_eq!(
            evaluate_clock_in(&user, false, monday_at(17, 0), false).unwrap_err(),
            Rejection::PastEndOfDay
        );
        assert_eq!(
            evaluate_clock_in(&user, false, monday_at(18, 30), false).unwrap_err(),
            Rejection::PastEndOfDay
        );
    }

    #[test]
    fn open_session_blocks_a_second_clock_in() {
        let err = evaluate_clock_in(&tracked_user(1), true, monday_at(9, 5), false).unwrap_err();
        assert_eq!(err, Rejection::AlreadyOpen);
    }

    #[test]
    fn unconfigured_user_cannot_clock_in() {
        let err =
            evaluate_clock_in(&untracked_user(1), false, monday_at(9, 5), false).unwrap_err();
        assert_eq!(err, Rejection::NotConfigured);

        let mut half_configured = tracked_user(2);
        half_configured.am_end = None;
        let err =
            evaluate_clock_in(&half_configured, false, monday_at(9, 5), false).unwrap_err();
        assert_eq!(err, Rejection::NotConfigured);
    }

    #[test]
    fn non_working_day_is_rejected_unless_exempt() {
        let saturday = NaiveDate::from_ymd_opt(2026, 8, 8)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let user = tracked_user(1);
        assert_eq!(
            evaluate_clock_in(&user, false, saturday, false).unwrap_err(),
            Rejection::NonWorkingDay
        );

        let grant = evaluate_clock_in(&user, false, saturday, true).unwrap();
        assert_eq!(grant.late_minutes, 0);
    }

    #[test]
    fn exempt_skips_timing_checks_with_zero_lateness() {
        let grant = evaluate_clock_in(&tracked_user(1), false, monday_at(20, 0), true).unwrap();
        assert_eq!(grant.late_minutes, 0);
    }

    #[test]
    fn clock_out_without_open_session_is_rejected() {
        let err =
            evaluate_clock_out(&tracked_user(1), None, monday_at(16, 0), false).unwrap_err();
        assert_eq!(err, Rejection::NoOpenSession);
    }

    #[test]
    fn clock_out_counts_elapsed_wall_clock_including_midday_gap() {
        let user = tracked_user(1);
        let record = open_record(monday_at(9, 10));
        // 09:10 -> 16:50 spans the unclocked midday gap; the gap is not
        // subtracted from the worked time
        let grant =
            evaluate_clock_out(&user, Some(&record), monday_at(16, 50), false).unwrap();
        assert_eq!(grant.worked_minutes, 460);
    }

    #[test]
    fn clock_out_at_or_after_day_end_needs_the_exempt_bypass() {
        let user = tracked_user(1);
        let record = open_record(monday_at(9, 10));
        assert_eq!(
            evaluate_clock_out(&user, Some(&record), monday_at(17, 5), false).unwrap_err(),
            Rejection::PastEndOfDay
        );

        let grant = evaluate_clock_out(&user, Some(&record), monday_at(17, 5), true).unwrap();
        assert_eq!(grant.worked_minutes, 475);
    }

    #[test]
    fn clock_out_never_goes_negative() {
        let user = tracked_user(1);
        let record = open_record(monday_at(10, 0));
        let grant = evaluate_clock_out(&user, Some(&record), monday_at(9, 59), false).unwrap();
        assert_eq!(grant.worked_minutes, 0);
    }
}
