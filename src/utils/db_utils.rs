use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use sqlx::MySqlPool;

use crate::model::clock_record::ClockRecord;
use crate::model::user::User;

pub async fn fetch_user(pool: &MySqlPool, user_id: u64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Users a report is scoped to: one user, one team, or every active account.
pub async fn fetch_users_scoped(
    pool: &MySqlPool,
    user_id: Option<u64>,
    team_id: Option<u64>,
) -> Result<Vec<User>, sqlx::Error> {
    if let Some(user_id) = user_id {
        return sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_all(pool)
            .await;
    }

    if let Some(team_id) = team_id {
        return sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE team_id = ? AND is_active = TRUE",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await;
    }

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE is_active = TRUE")
        .fetch_all(pool)
        .await
}

pub async fn fetch_open_record(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<Option<ClockRecord>, sqlx::Error> {
    sqlx::query_as::<_, ClockRecord>(
        "SELECT id, user_id, date, clock_in_at, clock_out_at, late_minutes, worked_minutes, source \
         FROM clock_records WHERE user_id = ? AND clock_out_at IS NULL \
         ORDER BY clock_in_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Records for a set of users with `clock_in_at` inside `[from, to]`
/// (inclusive calendar days).
pub async fn fetch_records_in_range(
    pool: &MySqlPool,
    user_ids: &[u64],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<ClockRecord>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; user_ids.len()].join(", ");
    let sql = format!(
        "SELECT id, user_id, date, clock_in_at, clock_out_at, late_minutes, worked_minutes, source \
         FROM clock_records \
         WHERE user_id IN ({placeholders}) AND clock_in_at >= ? AND clock_in_at < ? \
         ORDER BY clock_in_at ASC"
    );

    let mut query = sqlx::query_as::<_, ClockRecord>(&sql);
    for id in user_ids {
        query = query.bind(id);
    }
    let start = from.and_hms_opt(0, 0, 0).unwrap_or_default();
    let end = to
        .succ_opt()
        .unwrap_or(to)
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default();
    query.bind(start).bind(end).fetch_all(pool).await
}

/// ===============================
/// Schedule update SQL builder
/// ===============================

#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    Null,
}

#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

const TIME_COLUMNS: [&str; 4] = ["am_start", "am_end", "pm_start", "pm_end"];

fn is_hhmm(raw: &str) -> bool {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").is_ok()
}

fn is_working_days_list(raw: &str) -> bool {
    raw.split(',')
        .all(|tok| matches!(tok.trim().parse::<u32>(), Ok(d) if d <= 6))
}

/// Build a dynamic `UPDATE users SET ...` from a JSON payload, restricted to
/// the schedule columns. Unknown keys and malformed values are refused so a
/// schedule edit can never touch credentials or roles.
pub fn build_schedule_update(payload: &Value, user_id: u64) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    let mut columns = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len() + 1);

    for (key, value) in obj {
        let column = key.as_str();
        match (column, value) {
            (_, Value::Null)
                if TIME_COLUMNS.contains(&column)
                    || matches!(
                        column,
                        "contract_type" | "grace_minutes" | "working_days" | "team_id"
                    ) =>
            {
                values.push(SqlValue::Null);
            }
            (c, Value::String(s)) if TIME_COLUMNS.contains(&c) => {
                if !is_hhmm(s) {
                    return Err(ErrorBadRequest(format!("{c} must be HH:MM")));
                }
                values.push(SqlValue::String(s.trim().to_string()));
            }
            ("contract_type", Value::String(s)) => {
                values.push(SqlValue::String(s.trim().to_string()));
            }
            ("working_days", Value::String(s)) => {
                if !is_working_days_list(s) {
                    return Err(ErrorBadRequest(
                        "working_days must be comma-separated weekday numbers 0-6",
                    ));
                }
                values.push(SqlValue::String(s.trim().to_string()));
            }
            ("grace_minutes", Value::Number(n)) => {
                let minutes = n
                    .as_i64()
                    .ok_or_else(|| ErrorBadRequest("grace_minutes must be an integer"))?;
                values.push(SqlValue::I64(minutes));
            }
            ("team_id", Value::Number(n)) => {
                let id = n
                    .as_i64()
                    .ok_or_else(|| ErrorBadRequest("team_id must be an integer"))?;
                values.push(SqlValue::I64(id));
            }
            _ => {
                return Err(ErrorBadRequest(format!(
                    "Unknown or malformed schedule field: {column}"
                )));
            }
        }
        columns.push(format!("{column} = ?"));
    }

    let sql = format!("UPDATE users SET {} WHERE id = ?", columns.join(", "));
    values.push(SqlValue::I64(user_id as i64));

    Ok(SqlUpdate { sql, values })
}

pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}
