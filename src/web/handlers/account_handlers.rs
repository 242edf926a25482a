// src/web/handlers/account_handlers.rs
use crate::app_log;
use crate::auth::AuthenticatedEmployer;
use crate::types::{Employer, EmployerContactUpdate};
use crate::web::types::{
    DataResponse, StandardErrorResponse, StandardRequest, WithConversationId,
};

use rocket::serde::json::Json;

pub async fn get_current_employer_handler(
    auth: AuthenticatedEmployer,
) -> Json<DataResponse<Employer>> {
    Json(DataResponse::success(
        format!("Signed in as {}", auth.company_name()),
        auth.employer,
        None,
    ))
}

pub async fn update_current_employer_handler(
    request: Json<StandardRequest<EmployerContactUpdate>>,
    auth: AuthenticatedEmployer,
) -> Result<Json<DataResponse<Employer>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();

    app_log!(
        info,
        "Updating contact details for employer {}",
        auth.employer_id()
    );

    match auth.manager.update_contact(&request.data).await {
        Ok(employer) => Ok(Json(DataResponse::success(
            "Profile updated".to_string(),
            employer,
            conversation_id,
        ))),
        Err(e) => Err(Json(StandardErrorResponse::from_session_error(
            &e,
            conversation_id,
        ))),
    }
}
