use chrono::{Local, NaiveDateTime};
use sqlx::MySqlPool;
use std::collections::HashMap;
use tracing::{debug, error};

use crate::engine::schedule::{EffectiveSchedule, resolve_schedule};
use crate::model::clock_record::{ClockRecord, ClockSource};
use crate::model::user::User;

/// The values an auto-close writes back onto a stale record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closure {
    pub clock_out_at: NaiveDateTime,
    pub worked_minutes: i64,
}

/// Decide whether an open record is stale at `now`. The credited time stops
/// exactly at the scheduled end of the record's day, not at `now`. `None`
/// for closed records or while the day is still running, so re-running the
/// sweep is a no-op.
pub fn stale_closure(
    schedule: &EffectiveSchedule,
    record: &ClockRecord,
    now: NaiveDateTime,
) -> Option<Closure> {
    if !record.is_open() {
        return None;
    }

    let day_end = schedule.end_of_day(record.date);
    if now < day_end {
        return None;
    }

    Some(Closure {
        clock_out_at: day_end,
        worked_minutes: (day_end - record.clock_in_at).num_minutes().max(0),
    })
}

/// Close every stale open session belonging to `user_ids`.
///
/// Must run before any read or write that depends on "is there an open
/// session" for these users, so a stale session never blocks a fresh
/// clock-in or leaks into a report. Updates are independent per record; a
/// failed one is logged and the scan continues.
pub async fn auto_close(pool: &MySqlPool, user_ids: &[u64]) -> anyhow::Result<()> {
    if user_ids.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; user_ids.len()].join(", ");

    let sql = format!(
        "SELECT id, user_id, date, clock_in_at, clock_out_at, late_minutes, worked_minutes, source \
         FROM clock_records WHERE clock_out_at IS NULL AND user_id IN ({placeholders})"
    );
    let mut open_query = sqlx::query_as::<_, ClockRecord>(&sql);
    for id in user_ids {
        open_query = open_query.bind(id);
    }
    let open = open_query.fetch_all(pool).await?;

    if open.is_empty() {
        return Ok(());
    }

    let sql = format!("SELECT * FROM users WHERE id IN ({placeholders})");
    let mut users_query = sqlx::query_as::<_, User>(&sql);
    for id in user_ids {
        users_query = users_query.bind(id);
    }
    let users: HashMap<u64, User> = users_query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let now = Local::now().naive_local();

    for record in open {
        let Some(user) = users.get(&record.user_id) else {
            continue;
        };
        let schedule = resolve_schedule(user);
        let Some(closure) = stale_closure(&schedule, &record, now) else {
            continue;
        };

        let result = sqlx::query(
            "UPDATE clock_records \
             SET clock_out_at = ?, worked_minutes = ?, source = ? \
             WHERE id = ? AND clock_out_at IS NULL",
        )
        .bind(closure.clock_out_at)
        .bind(closure.worked_minutes)
        .bind(ClockSource::Auto.to_string())
        .bind(record.id)
        .execute(pool)
        .await;

        match result {
            Ok(_) => {
                debug!(
                    record_id = record.id,
                    user_id = record.user_id,
                    worked_minutes = closure.worked_minutes,
                    "Auto-closed stale session"
                );
            }
            Err(e) => {
                // independent per record: keep sweeping the rest
                error!(error = %e, record_id = record.id, "Failed to auto-close session");
            }
        }
    }

    Ok(())
}

/// Sweep every open session in the system. Used by the background task.
pub async fn auto_close_all(pool: &MySqlPool) -> anyhow::Result<()> {
    let user_ids: Vec<u64> = sqlx::query_scalar(
        "SELECT DISTINCT user_id FROM clock_records WHERE clock_out_at IS NULL",
    )
    .fetch_all(pool)
    .await?;

    auto_close(pool, &user_ids).await
}
