pub mod clock;
pub mod report;
pub mod team;
pub mod user_schedule;

use actix_web::HttpResponse;
use serde_json::json;

use crate::engine::Rejection;

/// Map an engine rejection onto the HTTP surface. Configuration problems are
/// forbidden (the caller cannot fix them); everything else is a bad request.
pub fn rejection_response(rejection: Rejection) -> HttpResponse {
    let body = json!({ "error": rejection.to_string() });
    match rejection {
        Rejection::NotConfigured => HttpResponse::Forbidden().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}
