use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::api::rejection_response;
use crate::auth::extractor::AuthUser;
use crate::engine::aggregate::{Summary, aggregate, daily_totals, weekly_totals};
use crate::engine::{Rejection, reaper};
use crate::model::clock_record::ClockRecord;
use crate::model::role::Role;
use crate::model::user::User;
use crate::utils::db_utils::{fetch_records_in_range, fetch_users_scoped};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    #[schema(example = "2026-08-01", value_type = String, format = "date")]
    pub from: Option<NaiveDate>,

    #[schema(example = "2026-08-31", value_type = String, format = "date")]
    pub to: Option<NaiveDate>,

    /// Restrict to a single user.
    #[schema(example = 42)]
    pub user_id: Option<u64>,

    /// Restrict to a team. Ignored when `user_id` is present.
    #[schema(example = 3)]
    pub team_id: Option<u64>,
}

/// Employees may only report on themselves; managers and admins on anyone.
fn check_scope(auth: &AuthUser, query: &ReportQuery) -> actix_web::Result<()> {
    if auth.role == Role::Employee && query.user_id != Some(auth.user_id) {
        return Err(actix_web::error::ErrorForbidden("Own records only"));
    }
    Ok(())
}

/// Load the scoped users and their records, sweeping stale sessions first so
/// no open record leaks its zero worked-minutes into a report.
async fn load_report_inputs(
    pool: &MySqlPool,
    query: &ReportQuery,
    from: NaiveDate,
    to: NaiveDate,
) -> actix_web::Result<(Vec<User>, Vec<ClockRecord>)> {
    let users = fetch_users_scoped(pool, query.user_id, query.team_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch report users");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let user_ids: Vec<u64> = users.iter().map(|u| u.id).collect();

    reaper::auto_close(pool, &user_ids).await.map_err(|e| {
        error!(error = %e, "Stale session sweep failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let records = fetch_records_in_range(pool, &user_ids, from, to)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch clock records");
            ErrorInternalServerError("Internal Server Error")
        })?;

    debug!(
        users = users.len(),
        records = records.len(),
        %from,
        %to,
        "Report inputs loaded"
    );

    Ok((users, records))
}

/// Period attendance summary
#[utoipa::path(
    get,
    path = "/api/v1/report/summary",
    params(ReportQuery),
    responses(
        (status = 200, description = "Attendance summary with daily series", body = Summary),
        (status = 400, description = "Missing date range", body = Object, example = json!({
            "error": "range-required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    check_scope(&auth, &query)?;

    let (Some(from), Some(to)) = (query.from, query.to) else {
        return Ok(rejection_response(Rejection::RangeRequired));
    };

    let (users, records) = load_report_inputs(pool.get_ref(), &query, from, to).await?;

    match aggregate(&users, &records, Some(from), Some(to)) {
        Ok(summary) => Ok(HttpResponse::Ok().json(summary)),
        Err(rejection) => Ok(rejection_response(rejection)),
    }
}

/// Worked hours per calendar day
#[utoipa::path(
    get,
    path = "/api/v1/report/daily",
    params(ReportQuery),
    responses(
        (status = 200, description = "Worked hours grouped by day", body = Object, example = json!({
            "daily": [{ "date": "2026-08-03", "hours": 6.5 }]
        })),
        (status = 400, description = "Missing date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn daily(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    check_scope(&auth, &query)?;

    let (Some(from), Some(to)) = (query.from, query.to) else {
        return Ok(rejection_response(Rejection::RangeRequired));
    };

    let (_, records) = load_report_inputs(pool.get_ref(), &query, from, to).await?;

    Ok(HttpResponse::Ok().json(json!({ "daily": daily_totals(&records) })))
}

/// Worked hours per week bucket
#[utoipa::path(
    get,
    path = "/api/v1/report/weekly",
    params(ReportQuery),
    responses(
        (status = 200, description = "Worked hours grouped by week bucket", body = Object, example = json!({
            "weekly": [{ "week": "2026-W1", "hours": 32.5 }]
        })),
        (status = 400, description = "Missing date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn weekly(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    check_scope(&auth, &query)?;

    let (Some(from), Some(to)) = (query.from, query.to) else {
        return Ok(rejection_response(Rejection::RangeRequired));
    };

    let (_, records) = load_report_inputs(pool.get_ref(), &query, from, to).await?;

    Ok(HttpResponse::Ok().json(json!({ "weekly": weekly_totals(&records) })))
}
