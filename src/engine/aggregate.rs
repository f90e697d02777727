use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::engine::Rejection;
use crate::engine::expected::expected_daily_hours;
use crate::model::clock_record::ClockRecord;
use crate::model::user::User;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyHoursPoint {
    #[schema(example = "2026-08-03")]
    pub date: String,
    #[schema(example = 6.5)]
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyRatePoint {
    #[schema(example = "2026-08-03")]
    pub date: String,
    #[schema(example = 25.0)]
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeeklyHoursPoint {
    #[schema(example = "2026-W2")]
    pub week: String,
    #[schema(example = 32.5)]
    pub hours: f64,
}

/// Period report over one or more users. Field names are the wire contract
/// consumed by the dashboards, hence the camelCase rename.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_hours: f64,
    pub lateness_rate: f64,
    pub attendance_rate: f64,
    pub average_hours: f64,
    pub shift_count: u64,
    pub expected_shift_count: u64,
    pub late_count: u64,
    pub worked_hours: f64,
    pub expected_hours: f64,
    pub absence_count: u64,
    pub absence_rate: f64,
    pub daily_worked: Vec<DailyHoursPoint>,
    pub daily_lateness_rate: Vec<DailyRatePoint>,
    pub daily_attendance_rate: Vec<DailyRatePoint>,
    pub daily_absence_rate: Vec<DailyRatePoint>,
}

/// Per-day accumulator. Keyed by calendar date so days never share counters.
#[derive(Debug, Default, Clone, Copy)]
struct DayAcc {
    worked_minutes: i64,
    late_firsts: u64,
    expected_shifts: u64,
    expected_minutes: f64,
}

fn pct(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den * 100.0 } else { 0.0 }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Aggregate raw clock records over `[from, to]` (inclusive calendar days)
/// into period totals, rates and daily chart series.
///
/// A "shift" is one (user, date) group of records; only the group's earliest
/// record decides lateness, while every record's worked minutes count toward
/// the totals. Rates with a zero denominator are 0, never NaN.
pub fn aggregate(
    users: &[User],
    records: &[ClockRecord],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Summary, Rejection> {
    let (Some(from), Some(to)) = (from, to) else {
        return Err(Rejection::RangeRequired);
    };

    let in_range: Vec<&ClockRecord> = records
        .iter()
        .filter(|r| {
            let day = r.clock_in_at.date();
            day >= from && day <= to
        })
        .collect();

    // one shift per (user, date); earliest record represents the shift
    let mut shifts: BTreeMap<(u64, NaiveDate), Vec<&ClockRecord>> = BTreeMap::new();
    for record in &in_range {
        shifts
            .entry((record.user_id, record.date))
            .or_default()
            .push(*record);
    }
    for group in shifts.values_mut() {
        group.sort_by_key(|r| r.clock_in_at);
    }

    let mut days: BTreeMap<NaiveDate, DayAcc> = BTreeMap::new();
    for day in from.iter_days() {
        if day > to {
            break;
        }
        let acc = days.entry(day).or_default();
        for user in users {
            let hours = expected_daily_hours(user, day);
            if hours > 0.0 {
                acc.expected_shifts += 1;
            }
            acc.expected_minutes += hours * 60.0;
        }
    }

    let mut worked_minutes_total: i64 = 0;
    let mut late_count: u64 = 0;
    for ((_, date), group) in &shifts {
        let acc = days.entry(*date).or_default();
        for record in group {
            worked_minutes_total += record.worked_minutes;
            acc.worked_minutes += record.worked_minutes;
        }
        if group[0].late_minutes > 0 {
            late_count += 1;
            acc.late_firsts += 1;
        }
    }

    let shift_count = shifts.len() as u64;
    let expected_shift_count: u64 = days.values().map(|a| a.expected_shifts).sum();
    let expected_minutes: f64 = days.values().map(|a| a.expected_minutes).sum();
    let absence_count = expected_shift_count.saturating_sub(shift_count);

    let total_hours = worked_minutes_total as f64 / 60.0;
    let average_hours = if users.is_empty() {
        0.0
    } else {
        total_hours / users.len() as f64
    };

    let mut daily_worked = Vec::with_capacity(days.len());
    let mut daily_lateness_rate = Vec::with_capacity(days.len());
    let mut daily_attendance_rate = Vec::with_capacity(days.len());
    let mut daily_absence_rate = Vec::with_capacity(days.len());
    for (day, acc) in &days {
        let date = iso_date(*day);
        let worked = acc.worked_minutes as f64;
        daily_worked.push(DailyHoursPoint {
            date: date.clone(),
            hours: worked / 60.0,
        });
        daily_lateness_rate.push(DailyRatePoint {
            date: date.clone(),
            value: pct(acc.late_firsts as f64, acc.expected_shifts as f64),
        });
        daily_attendance_rate.push(DailyRatePoint {
            date: date.clone(),
            value: pct(worked, acc.expected_minutes),
        });
        daily_absence_rate.push(DailyRatePoint {
            date,
            value: if acc.expected_minutes > 0.0 {
                (1.0 - worked / acc.expected_minutes) * 100.0
            } else {
                0.0
            },
        });
    }

    Ok(Summary {
        total_hours,
        lateness_rate: pct(late_count as f64, expected_shift_count as f64),
        attendance_rate: pct(worked_minutes_total as f64, expected_minutes),
        average_hours,
        shift_count,
        expected_shift_count,
        late_count,
        worked_hours: total_hours,
        expected_hours: expected_minutes / 60.0,
        absence_count,
        absence_rate: pct(absence_count as f64, expected_shift_count as f64),
        daily_worked,
        daily_lateness_rate,
        daily_attendance_rate,
        daily_absence_rate,
    })
}

/// Worked hours grouped by calendar day, for the narrow team/user report.
pub fn daily_totals(records: &[ClockRecord]) -> Vec<DailyHoursPoint> {
    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for record in records {
        *by_day.entry(record.date).or_default() += record.worked_minutes;
    }
    by_day
        .into_iter()
        .map(|(day, minutes)| DailyHoursPoint {
            date: iso_date(day),
            hours: minutes as f64 / 60.0,
        })
        .collect()
}

/// Day-of-month week bucket, `year-W<ceil(day/7)>`. Not an ISO week: the
/// bucket resets every month and the key carries no month, so the dashboards
/// that consume it merge same-numbered weeks across months. Kept as-is for
/// compatibility.
pub fn week_bucket(date: NaiveDate) -> String {
    format!("{}-W{}", date.year(), (date.day() + 6) / 7)
}

/// Worked hours grouped by the week bucket above.
pub fn weekly_totals(records: &[ClockRecord]) -> Vec<WeeklyHoursPoint> {
    let mut by_week: BTreeMap<String, i64> = BTreeMap::new();
    for record in records {
        *by_week.entry(week_bucket(record.date)).or_default() += record.worked_minutes;
    }
    by_week
        .into_iter()
        .map(|(week, minutes)| WeeklyHoursPoint {
            week,
            hours: minutes as f64 / 60.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::clock_record::ClockSource;
    use crate::model::user::fixtures::{tracked_user, untracked_user};
    use chrono::NaiveDateTime;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn record(
        id: u64,
        user_id: u64,
        clock_in_at: NaiveDateTime,
        worked_minutes: i64,
        late_minutes: i64,
    ) -> ClockRecord {
        ClockRecord {
            id,
            user_id,
            date: clock_in_at.date(),
            clock_in_at,
            clock_out_at: Some(clock_in_at + chrono::Duration::minutes(worked_minutes)),
            late_minutes,
            worked_minutes,
            source: ClockSource::Manual.to_string(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[test]
    fn missing_range_is_refused() {
        let err = aggregate(&[], &[], None, Some(day(7))).unwrap_err();
        assert_eq!(err, Rejection::RangeRequired);
        let err = aggregate(&[], &[], Some(day(3)), None).unwrap_err();
        assert_eq!(err, Rejection::RangeRequired);
    }

    #[test]
    fn single_record_round_trips_worked_hours() {
        let users = vec![tracked_user(1)];
        // Monday 2026-08-03, 390 worked minutes
        let records = vec![record(1, 1, at(2026, 8, 3, 9, 10), 390, 0)];

        let s = aggregate(&users, &records, Some(day(3)), Some(day(3))).unwrap();
        assert_eq!(s.worked_hours, 390.0 / 60.0);
        assert_eq!(s.total_hours, s.worked_hours);
        assert_eq!(s.shift_count, 1);
        assert_eq!(s.expected_shift_count, 1);
        assert_eq!(s.expected_hours, 6.5);
        assert_eq!(s.late_count, 0);
        assert_eq!(s.absence_count, 0);
        assert_eq!(s.attendance_rate, 390.0 / 390.0 * 100.0);
        assert_eq!(s.average_hours, 6.5);
    }

    #[test]
    fn empty_user_set_yields_zero_rates_not_nan() {
        let s = aggregate(&[], &[], Some(day(3)), Some(day(7))).unwrap();
        assert_eq!(s.expected_shift_count, 0);
        assert_eq!(s.lateness_rate, 0.0);
        assert_eq!(s.attendance_rate, 0.0);
        assert_eq!(s.absence_rate, 0.0);
        assert_eq!(s.average_hours, 0.0);
        for point in &s.daily_lateness_rate {
            assert_eq!(point.value, 0.0);
        }
    }

    #[test]
    fn untracked_users_add_no_expectation() {
        let users = vec![untracked_user(1)];
        let s = aggregate(&users, &[], Some(day(3)), Some(day(7))).unwrap();
        assert_eq!(s.expected_shift_count, 0);
        assert_eq!(s.expected_hours, 0.0);
        assert_eq!(s.absence_rate, 0.0);
    }

    #[test]
    fn second_record_of_a_day_sums_work_but_not_lateness() {
        let users = vec![tracked_user(1)];
        let records = vec![
            // earliest record of the day is on time
            record(1, 1, at(2026, 8, 3, 9, 5), 170, 0),
            // afternoon re-entry is late but must not count as a late shift
            record(2, 1, at(2026, 8, 3, 14, 30), 150, 75),
        ];

        let s = aggregate(&users, &records, Some(day(3)), Some(day(3))).unwrap();
        assert_eq!(s.shift_count, 1);
        assert_eq!(s.late_count, 0);
        assert_eq!(s.lateness_rate, 0.0);
        assert_eq!(s.worked_hours, 320.0 / 60.0);
    }

    #[test]
    fn late_first_record_marks_the_shift_late() {
        let users = vec![tracked_user(1)];
        let records = vec![record(1, 1, at(2026, 8, 3, 9, 40), 350, 25)];

        let s = aggregate(&users, &records, Some(day(3)), Some(day(3))).unwrap();
        assert_eq!(s.late_count, 1);
        assert_eq!(s.lateness_rate, 100.0);
    }

    #[test]
    fn absences_are_expected_shifts_never_clocked() {
        let users = vec![tracked_user(1)];
        // Mon-Fri expected, only Mon/Tue/Wed clocked
        let records = vec![
            record(1, 1, at(2026, 8, 3, 9, 0), 390, 0),
            record(2, 1, at(2026, 8, 4, 9, 0), 390, 0),
            record(3, 1, at(2026, 8, 5, 9, 0), 390, 0),
        ];

        let s = aggregate(&users, &records, Some(day(3)), Some(day(7))).unwrap();
        assert_eq!(s.expected_shift_count, 5);
        assert_eq!(s.shift_count, 3);
        assert_eq!(s.absence_count, 2);
        assert_eq!(s.absence_rate, 40.0);
    }

    #[test]
    fn records_outside_the_range_are_ignored() {
        let users = vec![tracked_user(1)];
        let records = vec![
            record(1, 1, at(2026, 8, 3, 9, 0), 390, 0),
            record(2, 1, at(2026, 7, 31, 9, 0), 390, 0),
        ];

        let s = aggregate(&users, &records, Some(day(3)), Some(day(3))).unwrap();
        assert_eq!(s.shift_count, 1);
        assert_eq!(s.worked_hours, 6.5);
    }

    #[test]
    fn daily_series_cover_the_whole_range_in_order() {
        let users = vec![tracked_user(1)];
        let records = vec![record(1, 1, at(2026, 8, 4, 9, 0), 390, 20)];

        // Mon 3rd .. Sun 9th
        let s = aggregate(&users, &records, Some(day(3)), Some(day(9))).unwrap();
        assert_eq!(s.daily_worked.len(), 7);
        assert_eq!(s.daily_worked[0].date, "2026-08-03");
        assert_eq!(s.daily_worked[6].date, "2026-08-09");

        assert_eq!(s.daily_worked[1].hours, 6.5);
        assert_eq!(s.daily_lateness_rate[1].value, 100.0);
        assert_eq!(s.daily_attendance_rate[1].value, 100.0);
        assert_eq!(s.daily_absence_rate[1].value, 0.0);

        // Monday was expected but never worked
        assert_eq!(s.daily_absence_rate[0].value, 100.0);
        // the weekend carries no expectation: rates stay 0
        assert_eq!(s.daily_attendance_rate[5].value, 0.0);
        assert_eq!(s.daily_absence_rate[6].value, 0.0);
    }

    #[test]
    fn week_bucket_is_day_of_month_based() {
        assert_eq!(week_bucket(day(1)), "2026-W1");
        assert_eq!(week_bucket(day(7)), "2026-W1");
        assert_eq!(week_bucket(day(8)), "2026-W2");
        assert_eq!(week_bucket(day(31)), "2026-W5");
        // same key for week one of a different month, by design of the
        // legacy dashboards
        assert_eq!(week_bucket(NaiveDate::from_ymd_opt(2026, 9, 2).unwrap()), "2026-W1");
    }

    #[test]
    fn narrow_reductions_group_worked_minutes() {
        let records = vec![
            record(1, 1, at(2026, 8, 3, 9, 0), 390, 0),
            record(2, 2, at(2026, 8, 3, 9, 0), 120, 0),
            record(3, 1, at(2026, 8, 10, 9, 0), 60, 0),
        ];

        let daily = daily_totals(&records);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, "2026-08-03");
        assert_eq!(daily[0].hours, 510.0 / 60.0);
        assert_eq!(daily[1].hours, 1.0);

        let weekly = weekly_totals(&records);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].week, "2026-W1");
        assert_eq!(weekly[0].hours, 510.0 / 60.0);
        assert_eq!(weekly[1].week, "2026-W2");
    }
}
