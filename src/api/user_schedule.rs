use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Serialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::extractor::AuthUser;
use crate::engine::calendar::working_day_set;
use crate::engine::schedule::resolve_schedule;
use crate::utils::db_utils::{build_schedule_update, execute_update, fetch_user};

#[derive(Serialize, ToSchema)]
pub struct ScheduleOverrides {
    #[schema(example = "09:00", nullable = true)]
    pub am_start: Option<String>,
    #[schema(example = "12:00", nullable = true)]
    pub am_end: Option<String>,
    #[schema(example = "13:30", nullable = true)]
    pub pm_start: Option<String>,
    #[schema(example = "17:00", nullable = true)]
    pub pm_end: Option<String>,
    #[schema(example = 15, nullable = true)]
    pub grace_minutes: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct EffectiveScheduleDto {
    #[schema(example = "09:00")]
    pub am_start: String,
    #[schema(example = "12:00")]
    pub am_end: String,
    #[schema(example = "13:30")]
    pub pm_start: String,
    #[schema(example = "17:00")]
    pub pm_end: String,
    #[schema(example = 15)]
    pub grace_min: i64,
}

#[derive(Serialize, ToSchema)]
pub struct ScheduleResponse {
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "full-time", nullable = true)]
    pub contract_type: Option<String>,
    /// Working weekdays after validation and fallback, Sunday = 0.
    #[schema(example = json!([1, 2, 3, 4, 5]))]
    pub working_days: Vec<u32>,
    pub overrides: ScheduleOverrides,
    pub effective: EffectiveScheduleDto,
}

/// Resolved schedule for a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/schedule",
    params(
        ("user_id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Overrides and the resolved schedule", body = ScheduleResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn get_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    auth.require_can_view(user_id)?;

    let user = fetch_user(pool.get_ref(), user_id).await.map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch user");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(user) = user else {
        return Ok(HttpResponse::NotFound().json(json!({ "error": "User not found" })));
    };

    let effective = resolve_schedule(&user);

    Ok(HttpResponse::Ok().json(ScheduleResponse {
        user_id: user.id,
        username: user.username.clone(),
        contract_type: user.contract_type.clone(),
        working_days: working_day_set(&user),
        overrides: ScheduleOverrides {
            am_start: user.am_start,
            am_end: user.am_end,
            pm_start: user.pm_start,
            pm_end: user.pm_end,
            grace_minutes: user.grace_minutes,
        },
        effective: EffectiveScheduleDto {
            am_start: effective.am_start.format("%H:%M").to_string(),
            am_end: effective.am_end.format("%H:%M").to_string(),
            pm_start: effective.pm_start.format("%H:%M").to_string(),
            pm_end: effective.pm_end.format("%H:%M").to_string(),
            grace_min: effective.grace_min,
        },
    }))
}

/// Update a user's schedule configuration
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/schedule",
    params(
        ("user_id", Path, description = "User ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Schedule updated", body = Object, example = json!({
            "message": "Schedule updated"
        })),
        (status = 400, description = "Unknown or malformed field"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn update_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let user_id = path.into_inner();
    let update = build_schedule_update(&body, user_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, user_id, "Schedule update failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "error": "User not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Schedule updated" })))
}
