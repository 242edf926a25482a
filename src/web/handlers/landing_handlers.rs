// src/web/handlers/landing_handlers.rs
use crate::landing::{faqs_by_category, load_faqs, FaqCategory, Landing};
use crate::web::types::{DataResponse, ServerState};

use rocket::serde::json::Json;
use rocket::State;

pub async fn landing_handler(state: &State<ServerState>) -> Json<DataResponse<Landing>> {
    let landing = Landing::load(&state.public_repository()).await;
    Json(DataResponse::success(
        format!("{} featured workers", landing.featured.len()),
        landing,
        None,
    ))
}

pub async fn faqs_handler(state: &State<ServerState>) -> Json<DataResponse<Vec<FaqCategory>>> {
    let faqs = load_faqs(&state.public_repository()).await;
    Json(DataResponse::success(
        format!("{} questions", faqs.len()),
        faqs_by_category(&faqs),
        None,
    ))
}
