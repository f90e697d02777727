use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;

use crate::model::user::User;

pub const DEFAULT_GRACE_MIN: i64 = 15;

/// System-wide default shift: 09:00-12:00 / 13:30-17:00, 15 min grace.
static DEFAULT_SCHEDULE: Lazy<EffectiveSchedule> = Lazy::new(|| EffectiveSchedule {
    am_start: hhmm(9, 0),
    am_end: hhmm(12, 0),
    pm_start: hhmm(13, 30),
    pm_end: hhmm(17, 0),
    grace_min: DEFAULT_GRACE_MIN,
});

fn hhmm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid default schedule time")
}

/// A user's daily schedule with system defaults overlaid by their overrides.
/// Derived fresh per request, never persisted or cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveSchedule {
    pub am_start: NaiveTime,
    pub am_end: NaiveTime,
    pub pm_start: NaiveTime,
    pub pm_end: NaiveTime,
    pub grace_min: i64,
}

impl EffectiveSchedule {
    /// Scheduled end of day anchored onto a calendar date.
    pub fn end_of_day(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.pm_end)
    }
}

fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

/// Uses the override when it is set, non-empty and parses as `HH:MM`; the
/// field's default otherwise.
fn field_or(over: &Option<String>, default: NaiveTime) -> NaiveTime {
    over.as_deref()
        .filter(|s| !s.trim().is_empty())
        .and_then(parse_hhmm)
        .unwrap_or(default)
}

/// Overlay the user's schedule overrides onto the system defaults,
/// field by field. Never fails.
pub fn resolve_schedule(user: &User) -> EffectiveSchedule {
    let d = *DEFAULT_SCHEDULE;
    EffectiveSchedule {
        am_start: field_or(&user.am_start, d.am_start),
        am_end: field_or(&user.am_end, d.am_end),
        pm_start: field_or(&user.pm_start, d.pm_start),
        pm_end: field_or(&user.pm_end, d.pm_end),
        grace_min: user
            .grace_minutes
            .map(i64::from)
            .unwrap_or(DEFAULT_GRACE_MIN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::fixtures::{tracked_user, untracked_user};

    #[test]
    fn unconfigured_user_gets_system_defaults() {
        let s = resolve_schedule(&untracked_user(1));
        assert_eq!(s.am_start, hhmm(9, 0));
        assert_eq!(s.am_end, hhmm(12, 0));
        assert_eq!(s.pm_start, hhmm(13, 30));
        assert_eq!(s.pm_end, hhmm(17, 0));
        assert_eq!(s.grace_min, 15);
    }

    #[test]
    fn partial_overrides_overlay_field_by_field() {
        let mut user = untracked_user(1);
        user.am_start = Some("08:30".into());
        user.grace_minutes = Some(5);

        let s = resolve_schedule(&user);
        assert_eq!(s.am_start, hhmm(8, 30));
        // the other three fields stay at their defaults
        assert_eq!(s.am_end, hhmm(12, 0));
        assert_eq!(s.pm_start, hhmm(13, 30));
        assert_eq!(s.pm_end, hhmm(17, 0));
        assert_eq!(s.grace_min, 5);
    }

    #[test]
    fn fully_overridden_user_keeps_every_field() {
        let mut user = tracked_user(1);
        user.am_start = Some("07:00".into());
        user.am_end = Some("11:00".into());
        user.pm_start = Some("12:00".into());
        user.pm_end = Some("16:00".into());

        let s = resolve_schedule(&user);
        assert_eq!(s.am_start, hhmm(7, 0));
        assert_eq!(s.am_end, hhmm(11, 0));
        assert_eq!(s.pm_start, hhmm(12, 0));
        assert_eq!(s.pm_end, hhmm(16, 0));
    }

    #[test]
    fn blank_or_garbage_override_falls_back_per_field() {
        let mut user = untracked_user(1);
        user.am_start = Some("   ".into());
        user.pm_end = Some("25:99".into());

        let s = resolve_schedule(&user);
        assert_eq!(s.am_start, hhmm(9, 0));
        assert_eq!(s.pm_end, hhmm(17, 0));
    }

    #[test]
    fn end_of_day_anchors_onto_the_date() {
        let s = resolve_schedule(&tracked_user(1));
        let date = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        assert_eq!(s.end_of_day(date), date.and_hms_opt(17, 0, 0).unwrap());
    }
}
