use crate::api::report::ReportQuery;
use crate::api::team::CreateTeam;
use crate::api::user_schedule::{EffectiveScheduleDto, ScheduleOverrides, ScheduleResponse};
use crate::engine::aggregate::{DailyHoursPoint, DailyRatePoint, Summary, WeeklyHoursPoint};
use crate::model::clock_record::ClockRecord;
use crate::model::team::Team;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timeclock API",
        version = "1.0.0",
        description = r#"
## Employee Time Tracking

This API powers an employee **time-tracking and attendance reporting** service.

### 🔹 Key Features
- **Clocking**
  - Clock in against a per-user schedule with a grace window
  - Clock out with elapsed worked-minutes crediting
  - Stale open sessions auto-close at the scheduled end of day
- **Schedules**
  - Per-user overrides over the system default shift
  - Working-day calendars and grace periods
- **Reporting**
  - Attendance, lateness and absence rates per user or team
  - Daily chart series and weekly worked-hour buckets

### 🔐 Security
Endpoints are protected with **JWT Bearer authentication**.
Reports beyond a user's own records require the **Manager** or **Admin** role.

### 📦 Response Format
- JSON-based RESTful responses
- Clock rejections carry a machine-readable `error` reason

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::clock::clock_in,
        crate::api::clock::clock_out,
        crate::api::clock::clock_status,

        crate::api::report::summary,
        crate::api::report::daily,
        crate::api::report::weekly,

        crate::api::user_schedule::get_schedule,
        crate::api::user_schedule::update_schedule,

        crate::api::team::create_team,
        crate::api::team::list_teams
    ),
    components(
        schemas(
            ClockRecord,
            Summary,
            DailyHoursPoint,
            DailyRatePoint,
            WeeklyHoursPoint,
            ReportQuery,
            ScheduleResponse,
            ScheduleOverrides,
            EffectiveScheduleDto,
            Team,
            CreateTeam
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Clock", description = "Clock-in / clock-out APIs"),
        (name = "Report", description = "Attendance reporting APIs"),
        (name = "Schedule", description = "Schedule configuration APIs"),
        (name = "Team", description = "Team management APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
