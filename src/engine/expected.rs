use chrono::NaiveDate;

use crate::engine::calendar::is_working_day;
use crate::engine::schedule::resolve_schedule;
use crate::model::user::User;

/// Contractual paid hours for one calendar date.
///
/// 0 when the user has no contract type, an incomplete schedule, or the date
/// is not one of their working days. A half-day whose end precedes its start
/// contributes 0, never a negative amount.
pub fn expected_daily_hours(user: &User, date: NaiveDate) -> f64 {
    if !user.has_contract() || !user.has_schedule() || !is_working_day(user, date) {
        return 0.0;
    }

    let s = resolve_schedule(user);
    let am = (s.am_end - s.am_start).num_minutes().max(0);
    let pm = (s.pm_end - s.pm_start).num_minutes().max(0);
    (am + pm) as f64 / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::fixtures::{tracked_user, untracked_user};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
    }

    #[test]
    fn default_shape_yields_six_and_a_half_hours() {
        assert_eq!(expected_daily_hours(&tracked_user(1), monday()), 6.5);
    }

    #[test]
    fn no_contract_means_zero_on_any_date() {
        let mut user = tracked_user(1);
        user.contract_type = None;
        assert_eq!(expected_daily_hours(&user, monday()), 0.0);

        user.contract_type = Some("  ".into());
        assert_eq!(expected_daily_hours(&user, monday()), 0.0);
    }

    #[test]
    fn incomplete_schedule_means_zero() {
        let mut user = tracked_user(1);
        user.pm_end = None;
        assert_eq!(expected_daily_hours(&user, monday()), 0.0);

        assert_eq!(expected_daily_hours(&untracked_user(2), monday()), 0.0);
    }

    #[test]
    fn non_working_day_means_zero() {
        let saturday = NaiveDate::from_ymd_opt(2026, 8, 8).unwrap();
        assert_eq!(expected_daily_hours(&tracked_user(1), saturday), 0.0);
    }

    #[test]
    fn inverted_half_day_contributes_zero_not_negative() {
        let mut user = tracked_user(1);
        user.pm_start = Some("17:00".into());
        user.pm_end = Some("13:30".into());

        // morning block still counts, broken afternoon block does not
        assert_eq!(expected_daily_hours(&user, monday()), 3.0);
    }
}
