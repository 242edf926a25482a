// src/web/handlers/system_handlers.rs
use crate::app_log;
use crate::auth::OptionalAuth;
use crate::web::types::TextResponse;

use rocket::serde::json::Json;

pub async fn health_handler(auth: OptionalAuth) -> Json<TextResponse> {
    match &auth.employer {
        Some(employer) => app_log!(
            info,
            "Health check by employer: {} ({})",
            employer.employer_id(),
            employer.company_name()
        ),
        None => app_log!(info, "Health check by anonymous visitor"),
    }
    Json(TextResponse::success("OK".to_string(), None))
}
