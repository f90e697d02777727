use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// How a record was closed: by the user or by the stale-session sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ClockSource {
    Manual,
    Auto,
}

/// One clock-in / clock-out pair. `clock_out_at = NULL` marks an open
/// session; at most one open record may exist per user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ClockRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2026-08-03", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2026-08-03T09:10:00", value_type = String, format = "date-time")]
    pub clock_in_at: NaiveDateTime,

    #[schema(example = "2026-08-03T16:55:00", value_type = String, format = "date-time", nullable = true)]
    pub clock_out_at: Option<NaiveDateTime>,

    #[schema(example = 0)]
    pub late_minutes: i64,

    #[schema(example = 465)]
    pub worked_minutes: i64,

    #[schema(example = "manual")]
    pub source: String,
}

impl ClockRecord {
    pub fn is_open(&self) -> bool {
        self.clock_out_at.is_none()
    }
}
