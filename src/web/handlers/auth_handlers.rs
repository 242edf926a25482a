// src/web/handlers/auth_handlers.rs
use crate::app_log;
use crate::auth::BearerToken;
use crate::session::{SignUpForm, SignUpStatus};
use crate::web::types::{
    ActionResponse, DataResponse, ServerState, SessionPayload, SignInRequest,
    StandardErrorResponse, StandardRequest, WithConversationId,
};

use rocket::serde::json::Json;
use rocket::State;

pub async fn sign_up_handler(
    request: Json<StandardRequest<SignUpForm>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<SessionPayload>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let form = &request.data;
    let manager = state.session_manager();

    app_log!(info, "Sign-up requested for company: {}", form.company_name);

    match manager.sign_up(form).await {
        Ok(SignUpStatus::SignedIn) => Ok(Json(DataResponse::success(
            "Account created".to_string(),
            SessionPayload::from_state(&manager.state()),
            conversation_id,
        ))),
        Ok(SignUpStatus::ConfirmationPending) => Ok(Json(DataResponse::success(
            "Account created. Confirm your email address to sign in".to_string(),
            SessionPayload::confirmation_pending(),
            conversation_id,
        ))),
        Err(e) => {
            app_log!(warn, "Sign-up failed for {}: {}", form.email, e);
            Err(Json(StandardErrorResponse::from_session_error(
                &e,
                conversation_id,
            )))
        }
    }
}

pub async fn sign_in_handler(
    request: Json<StandardRequest<SignInRequest>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<SessionPayload>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let manager = state.session_manager();

    if let Err(e) = manager
        .sign_in(&request.data.email, &request.data.password)
        .await
    {
        app_log!(warn, "Sign-in failed for {}: {}", request.data.email, e);
        return Err(Json(StandardErrorResponse::from_session_error(
            &e,
            conversation_id,
        )));
    }

    let payload = SessionPayload::from_state(&manager.state());
    let message = match &payload.employer {
        Some(employer) => format!("Signed in to {}", employer.company_name),
        None => "Signed in, but the employer profile could not be loaded".to_string(),
    };

    Ok(Json(DataResponse::success(message, payload, conversation_id)))
}

pub async fn sign_out_handler(
    token: BearerToken,
    state: &State<ServerState>,
) -> Json<ActionResponse> {
    let manager = state.session_manager();
    if let Some(token) = token.0.as_deref() {
        manager.initialize(Some(token)).await;
    }
    manager.sign_out().await;

    Json(ActionResponse::success(
        "Signed out".to_string(),
        "signed_out".to_string(),
        None,
    ))
}
