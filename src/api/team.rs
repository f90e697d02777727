use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::extractor::AuthUser;
use crate::model::team::Team;

#[derive(Deserialize, ToSchema)]
pub struct CreateTeam {
    #[schema(example = "Night Shift")]
    pub name: String,
}

/// Create Team
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    request_body = CreateTeam,
    responses(
        (status = 201, description = "Team created", body = Object, example = json!({
            "message": "Team created"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Team name already exists"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn create_team(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTeam>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({ "error": "Team name required" })));
    }

    let result = sqlx::query("INSERT INTO teams (name) VALUES (?)")
        .bind(name)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({ "message": "Team created" }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "error": "Team name already exists"
                    })));
                }
            }

            error!(error = %e, "Failed to create team");
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            })))
        }
    }
}

/// List Teams
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    responses(
        (status = 200, description = "All teams", body = [Team]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn list_teams(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let teams = sqlx::query_as::<_, Team>("SELECT id, name FROM teams ORDER BY name ASC")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch teams");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(teams))
}
