use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::Local;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;

use crate::api::rejection_response;
use crate::auth::extractor::AuthUser;
use crate::config::Config;
use crate::engine::Rejection;
use crate::engine::clock::{evaluate_clock_in, evaluate_clock_out};
use crate::engine::reaper;
use crate::model::clock_record::ClockSource;
use crate::model::user::User;
use crate::utils::db_utils::{fetch_open_record, fetch_user};

/// Reap stale sessions for the caller, then load their account. Every clock
/// transition starts here so yesterday's forgotten session can never block
/// today's clock-in.
async fn prepare_user(pool: &MySqlPool, user_id: u64) -> actix_web::Result<Option<User>> {
    reaper::auto_close(pool, &[user_id]).await.map_err(|e| {
        error!(error = %e, user_id, "Stale session sweep failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    fetch_user(pool, user_id).await.map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch user");
        ErrorInternalServerError("Internal Server Error")
    })
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/clock/in",
    responses(
        (status = 200, description = "Clocked in", body = Object, example = json!({
            "message": "Clocked in",
            "late_minutes": 0
        })),
        (status = 400, description = "Rejected clock action", body = Object, example = json!({
            "error": "already-open"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "User not configured for attendance"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let Some(user) = prepare_user(pool.get_ref(), auth.user_id).await? else {
        return Ok(HttpResponse::NotFound().json(json!({ "error": "User not found" })));
    };

    let open = fetch_open_record(pool.get_ref(), user.id).await.map_err(|e| {
        error!(error = %e, user_id = user.id, "Failed to fetch open session");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let now = Local::now().naive_local();
    let exempt = config.clock_exempt_user_id == Some(user.id);

    let grant = match evaluate_clock_in(&user, open.is_some(), now, exempt) {
        Ok(grant) => grant,
        Err(rejection) => return Ok(rejection_response(rejection)),
    };

    sqlx::query(
        "INSERT INTO clock_records \
         (user_id, date, clock_in_at, clock_out_at, late_minutes, worked_minutes, source) \
         VALUES (?, ?, ?, NULL, ?, 0, ?)",
    )
    .bind(user.id)
    .bind(now.date())
    .bind(now)
    .bind(grant.late_minutes)
    .bind(ClockSource::Manual.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = user.id, "Clock-in insert failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Clocked in",
        "late_minutes": grant.late_minutes
    })))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/clock/out",
    responses(
        (status = 200, description = "Clocked out", body = Object, example = json!({
            "message": "Clocked out",
            "worked_minutes": 455
        })),
        (status = 400, description = "Rejected clock action", body = Object, example = json!({
            "error": "no-open-session"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let Some(user) = prepare_user(pool.get_ref(), auth.user_id).await? else {
        return Ok(HttpResponse::NotFound().json(json!({ "error": "User not found" })));
    };

    let open = fetch_open_record(pool.get_ref(), user.id).await.map_err(|e| {
        error!(error = %e, user_id = user.id, "Failed to fetch open session");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let now = Local::now().naive_local();
    let exempt = config.clock_exempt_user_id == Some(user.id);

    let grant = match evaluate_clock_out(&user, open.as_ref(), now, exempt) {
        Ok(grant) => grant,
        Err(rejection) => return Ok(rejection_response(rejection)),
    };

    let Some(record) = open else {
        return Ok(rejection_response(Rejection::NoOpenSession));
    };

    let result = sqlx::query(
        "UPDATE clock_records SET clock_out_at = ?, worked_minutes = ?, source = ? \
         WHERE id = ? AND clock_out_at IS NULL",
    )
    .bind(now)
    .bind(grant.worked_minutes)
    .bind(ClockSource::Manual.to_string())
    .bind(record.id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = user.id, "Clock-out update failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // lost a race with the sweep: the session is no longer open
    if result.rows_affected() == 0 {
        return Ok(rejection_response(Rejection::NoOpenSession));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Clocked out",
        "worked_minutes": grant.worked_minutes
    })))
}

/// Open-session status for the calling user
#[utoipa::path(
    get,
    path = "/api/v1/clock/status",
    responses(
        (status = 200, description = "Current open session, if any", body = Object, example = json!({
            "open": null
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn clock_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    reaper::auto_close(pool.get_ref(), &[auth.user_id])
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Stale session sweep failed");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let open = fetch_open_record(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch open session");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "open": open })))
}
