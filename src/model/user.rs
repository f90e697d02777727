use serde::Deserialize;

/// Account row. Schedule override fields hold `"HH:MM"` strings and stay
/// `None` for users that are not tracked for attendance.
#[derive(Debug, Clone, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub role_id: u8,
    pub team_id: Option<u64>,
    pub contract_type: Option<String>,
    pub am_start: Option<String>,
    pub am_end: Option<String>,
    pub pm_start: Option<String>,
    pub pm_end: Option<String>,
    pub grace_minutes: Option<i32>,
    /// Comma-separated weekday numbers, Sunday = 0.
    pub working_days: Option<String>,
    pub is_active: bool,
}

impl User {
    pub fn has_contract(&self) -> bool {
        self.contract_type
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    /// All four daily time fields are set. A user missing any of them is not
    /// configured for attendance: expected hours are 0 and clock-in is refused.
    pub fn has_schedule(&self) -> bool {
        [&self.am_start, &self.am_end, &self.pm_start, &self.pm_end]
            .iter()
            .all(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::User;

    /// Mon-Fri employee on the 09:00-12:00 / 13:30-17:00 default shape.
    pub fn tracked_user(id: u64) -> User {
        User {
            id,
            username: format!("user{id}"),
            password: String::new(),
            role_id: 3,
            team_id: None,
            contract_type: Some("full-time".into()),
            am_start: Some("09:00".into()),
            am_end: Some("12:00".into()),
            pm_start: Some("13:30".into()),
            pm_end: Some("17:00".into()),
            grace_minutes: Some(15),
            working_days: Some("1,2,3,4,5".into()),
            is_active: true,
        }
    }

    pub fn untracked_user(id: u64) -> User {
        User {
            contract_type: None,
            am_start: None,
            am_end: None,
            pm_start: None,
            pm_end: None,
            grace_minutes: None,
            working_days: None,
            ..tracked_user(id)
        }
    }
}
