// src/web/mod.rs
//! JSON API consumed by the front end. Everything is mounted under `/api`.

pub mod handlers;
pub mod types;

pub use types::*;

use crate::app_log;
use crate::auth::{AuthenticatedEmployer, BearerToken, OptionalAuth, TokenVerifier};
use crate::core::{ConfigManager, SupabaseClient};
use crate::landing::{FaqCategory, Landing};
use crate::profile::WorkerDetail;
use crate::session::SignUpForm;
use crate::types::{Employer, EmployerContactUpdate};
use anyhow::{anyhow, Result};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, patch, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// ===== Auth Routes =====

#[post("/auth/signup", data = "<request>")]
pub async fn sign_up(
    request: Json<StandardRequest<SignUpForm>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<SessionPayload>>, Json<StandardErrorResponse>> {
    handlers::sign_up_handler(request, state).await
}

#[post("/auth/signin", data = "<request>")]
pub async fn sign_in(
    request: Json<StandardRequest<SignInRequest>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<SessionPayload>>, Json<StandardErrorResponse>> {
    handlers::sign_in_handler(request, state).await
}

#[post("/auth/signout")]
pub async fn sign_out(token: BearerToken, state: &State<ServerState>) -> Json<ActionResponse> {
    handlers::sign_out_handler(token, state).await
}

#[get("/me")]
pub async fn get_current_employer(auth: AuthenticatedEmployer) -> Json<DataResponse<Employer>> {
    handlers::get_current_employer_handler(auth).await
}

#[patch("/me", data = "<request>")]
pub async fn update_current_employer(
    request: Json<StandardRequest<EmployerContactUpdate>>,
    auth: AuthenticatedEmployer,
) -> Result<Json<DataResponse<Employer>>, Json<StandardErrorResponse>> {
    handlers::update_current_employer_handler(request, auth).await
}

// ===== Worker Routes =====

#[get("/workers?<q>&<shortlisted>")]
pub async fn list_workers(
    q: Option<String>,
    shortlisted: Option<bool>,
    auth: AuthenticatedEmployer,
) -> Json<DataResponse<WorkerListing>> {
    handlers::list_workers_handler(q, shortlisted, auth).await
}

#[post("/workers/<id>/shortlist")]
pub async fn toggle_shortlist(
    id: String,
    auth: AuthenticatedEmployer,
) -> Result<Json<DataResponse<ShortlistToggle>>, Json<StandardErrorResponse>> {
    handlers::toggle_shortlist_handler(id, auth).await
}

#[get("/workers/<id>")]
pub async fn worker_detail(
    id: String,
    auth: AuthenticatedEmployer,
) -> Result<Json<DataResponse<WorkerDetail>>, Json<StandardErrorResponse>> {
    handlers::worker_detail_handler(id, auth).await
}

#[post("/workers/<id>/contact", data = "<request>")]
pub async fn contact_worker(
    id: String,
    request: Json<StandardRequest<ContactRequestBody>>,
    auth: AuthenticatedEmployer,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<ContactReceipt>>, Json<StandardErrorResponse>> {
    handlers::contact_worker_handler(id, request, auth, state).await
}

// ===== Public Routes =====

#[get("/landing")]
pub async fn landing(state: &State<ServerState>) -> Json<DataResponse<Landing>> {
    handlers::landing_handler(state).await
}

#[get("/faqs")]
pub async fn faqs(state: &State<ServerState>) -> Json<DataResponse<Vec<FaqCategory>>> {
    handlers::faqs_handler(state).await
}

#[get("/health")]
pub async fn health(auth: OptionalAuth) -> Json<TextResponse> {
    handlers::health_handler(auth).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Authentication required".to_string(),
        "AUTHORIZATION_ERROR".to_string(),
        vec!["Sign in to continue".to_string()],
        None,
    ))
}

#[rocket::catch(403)]
pub fn forbidden() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "No employer profile for this account".to_string(),
        "PROFILE_MISSING".to_string(),
        vec!["Contact support to restore your employer profile".to_string()],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be read".to_string(),
        "BAD_REQUEST".to_string(),
        vec!["Verify all required fields are present".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Assemble the application without binding a port.
pub fn build_rocket(state: ServerState) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable,
                internal_error
            ],
        )
        .mount(
            "/api",
            routes![
                sign_up,
                sign_in,
                sign_out,
                get_current_employer,
                update_current_employer,
                list_workers,
                toggle_shortlist,
                worker_detail,
                contact_worker,
                landing,
                faqs,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let client = SupabaseClient::new(
        &config.supabase.url,
        &config.supabase.anon_key,
        config.supabase.timeout_seconds,
    )?;

    let mut state = ServerState::new(Arc::new(client))
        .with_contact_confirm_delay(config.server.contact_confirm_delay);
    match &config.supabase.jwt_secret {
        Some(secret) => state = state.with_token_verifier(TokenVerifier::new(secret)),
        None => app_log!(
            warn,
            "SUPABASE_JWT_SECRET not set; access tokens are checked against the auth API"
        ),
    }

    app_log!(info, "Starting Pazzle API server on port {}", config.server.port);
    app_log!(info, "Store: {}", config.supabase.url);

    let figment = rocket::Config::figment().merge(("port", config.server.port));

    let _rocket = build_rocket(state)
        .configure(figment)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket server failed: {:?}", e))?;

    Ok(())
}
