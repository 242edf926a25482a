// src/web/handlers/worker_handlers.rs
use crate::app_log;
use crate::auth::AuthenticatedEmployer;
use crate::dashboard::{Dashboard, Shortlist, ToggleOutcome, WorkerFilter};
use crate::profile::{ContactComposer, ContactOutcome, ProfileView, WorkerDetail};
use crate::types::ContactStatus;
use crate::web::types::{
    ContactReceipt, ContactRequestBody, DataResponse, ServerState, ShortlistToggle,
    StandardErrorResponse, StandardRequest, WithConversationId, WorkerListing,
};

use rocket::serde::json::Json;
use rocket::State;

pub async fn list_workers_handler(
    query: Option<String>,
    shortlisted: Option<bool>,
    auth: AuthenticatedEmployer,
) -> Json<DataResponse<WorkerListing>> {
    let repo = auth.manager.repository();
    let filter = WorkerFilter::new(query.as_deref().unwrap_or(""), shortlisted.unwrap_or(false));
    let dashboard = Dashboard::load(&repo, Some(auth.employer()))
        .await
        .with_filter(filter);

    let workers = dashboard.cards();
    let listing = WorkerListing {
        total: dashboard.workers.len(),
        shortlisted: dashboard.shortlist.len(),
        workers,
    };

    Json(DataResponse::success(
        format!("{} of {} workers", listing.workers.len(), listing.total),
        listing,
        None,
    ))
}

pub async fn toggle_shortlist_handler(
    worker_id: String,
    auth: AuthenticatedEmployer,
) -> Result<Json<DataResponse<ShortlistToggle>>, Json<StandardErrorResponse>> {
    let repo = auth.manager.repository();

    let mut shortlist = match repo.shortlisted_ids(auth.employer_id()).await {
        Ok(ids) => Shortlist::from_ids(ids),
        Err(e) => {
            app_log!(error, "Error loading shortlist: {}", e);
            return Err(Json(StandardErrorResponse::new(
                "Failed to load shortlist".to_string(),
                "SHORTLIST_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
                None,
            )));
        }
    };

    let outcome = shortlist
        .toggle(&repo, auth.employer_id(), &worker_id)
        .await;

    if outcome == ToggleOutcome::Unchanged {
        return Err(Json(StandardErrorResponse::new(
            "Failed to update shortlist".to_string(),
            "SHORTLIST_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
            None,
        )));
    }

    let message = match outcome {
        ToggleOutcome::Added => "Worker added to shortlist",
        _ => "Worker removed from shortlist",
    };

    Ok(Json(DataResponse::success(
        message.to_string(),
        ShortlistToggle {
            shortlisted: shortlist.contains(&worker_id),
            worker_id,
            outcome,
        },
        None,
    )))
}

pub async fn worker_detail_handler(
    worker_id: String,
    auth: AuthenticatedEmployer,
) -> Result<Json<DataResponse<WorkerDetail>>, Json<StandardErrorResponse>> {
    let repo = auth.manager.repository();

    match ProfileView::load(&repo, &worker_id).await {
        ProfileView::Ready(detail) => Ok(Json(DataResponse::success(
            format!("Profile of {}", detail.worker.full_name),
            *detail,
            None,
        ))),
        _ => Err(Json(StandardErrorResponse::new(
            "Worker not found".to_string(),
            "WORKER_NOT_FOUND".to_string(),
            vec!["Return to the worker list".to_string()],
            None,
        ))),
    }
}

pub async fn contact_worker_handler(
    worker_id: String,
    request: Json<StandardRequest<ContactRequestBody>>,
    auth: AuthenticatedEmployer,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<ContactReceipt>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let repo = auth.manager.repository();

    let mut composer = ContactComposer::new(&worker_id)
        .with_message(&request.data.message)
        .with_confirmation_delay(state.contact_confirm_delay);

    match composer.submit(&repo, Some(auth.employer())).await {
        ContactOutcome::Sent => Ok(Json(DataResponse::success(
            "Contact request sent".to_string(),
            ContactReceipt {
                worker_id,
                status: ContactStatus::Pending,
                confirmation_ms: u64::try_from(state.contact_confirm_delay.as_millis())
                    .unwrap_or(u64::MAX),
            },
            conversation_id,
        ))),
        ContactOutcome::Skipped => Err(Json(StandardErrorResponse::new(
            "Message is required".to_string(),
            "VALIDATION_ERROR".to_string(),
            vec!["Write a short message to the worker".to_string()],
            conversation_id,
        ))),
        ContactOutcome::Failed => Err(Json(StandardErrorResponse::new(
            "Failed to send contact request".to_string(),
            "CONTACT_REQUEST_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
            conversation_id,
        ))),
    }
}
