use chrono::{Datelike, NaiveDate};

use crate::model::user::User;

/// Mon-Fri, in the Sunday=0 weekday numbering the records use.
const FALLBACK_WORKING_DAYS: [u32; 5] = [1, 2, 3, 4, 5];

/// The user's configured working weekdays. Entries outside 0..=6 are
/// dropped; an empty or unset list falls back to Mon-Fri.
pub fn working_day_set(user: &User) -> Vec<u32> {
    let days: Vec<u32> = user
        .working_days
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter_map(|tok| tok.trim().parse::<u32>().ok())
        .filter(|d| *d <= 6)
        .collect();

    if days.is_empty() {
        FALLBACK_WORKING_DAYS.to_vec()
    } else {
        days
    }
}

/// Whether `date` is a working day for this user. Never fails.
pub fn is_working_day(user: &User, date: NaiveDate) -> bool {
    working_day_set(user).contains(&date.weekday().num_days_from_sunday())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::fixtures::tracked_user;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_week_is_monday_to_friday() {
        let mut user = tracked_user(1);
        user.working_days = None;

        assert!(is_working_day(&user, date(2026, 8, 3))); // Monday
        assert!(is_working_day(&user, date(2026, 8, 7))); // Friday
        assert!(!is_working_day(&user, date(2026, 8, 8))); // Saturday
        assert!(!is_working_day(&user, date(2026, 8, 9))); // Sunday
    }

    #[test]
    fn custom_set_controls_membership() {
        let mut user = tracked_user(1);
        user.working_days = Some("0,6".into()); // weekend crew

        assert!(is_working_day(&user, date(2026, 8, 8))); // Saturday
        assert!(is_working_day(&user, date(2026, 8, 9))); // Sunday
        assert!(!is_working_day(&user, date(2026, 8, 5))); // Wednesday
    }

    #[test]
    fn out_of_range_and_junk_entries_are_dropped() {
        let mut user = tracked_user(1);
        user.working_days = Some("1, 9, x, 3".into());

        assert_eq!(working_day_set(&user), vec![1, 3]);
    }

    #[test]
    fn all_invalid_entries_fall_back_to_weekdays() {
        let mut user = tracked_user(1);
        user.working_days = Some("7,8,abc".into());

        assert_eq!(working_day_set(&user), FALLBACK_WORKING_DAYS.to_vec());
        assert!(!is_working_day(&user, date(2026, 8, 9))); // Sunday
        assert!(is_working_day(&user, date(2026, 8, 4))); // Tuesday
    }
}
