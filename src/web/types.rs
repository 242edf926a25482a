// src/web/types.rs
use rocket::serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenVerifier;
use crate::core::store::{AuthBackend, RemoteStore, Repository};
use crate::dashboard::{ToggleOutcome, WorkerCard};
use crate::profile::CONTACT_CONFIRMATION_DELAY;
use crate::session::{SessionError, SessionManager, SessionState};
use crate::types::{AuthUser, ContactStatus, Employer};

// ===== Server State =====

/// Shared handles every request builds its session manager from.
pub struct ServerState {
    pub auth: Arc<dyn AuthBackend>,
    pub store: Arc<dyn RemoteStore>,
    pub verifier: Option<Arc<TokenVerifier>>,
    pub contact_confirm_delay: Duration,
}

impl ServerState {
    /// One backend serving both the auth and the table API.
    pub fn new<B>(backend: Arc<B>) -> Self
    where
        B: AuthBackend + RemoteStore + 'static,
    {
        let auth: Arc<dyn AuthBackend> = backend.clone();
        let store: Arc<dyn RemoteStore> = backend;
        Self {
            auth,
            store,
            verifier: None,
            contact_confirm_delay: CONTACT_CONFIRMATION_DELAY,
        }
    }

    pub fn with_token_verifier(mut self, verifier: TokenVerifier) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    pub fn with_contact_confirm_delay(mut self, delay: Duration) -> Self {
        self.contact_confirm_delay = delay;
        self
    }

    /// Fresh manager for one request; state starts at `Unknown`.
    pub fn session_manager(&self) -> SessionManager {
        let manager = SessionManager::new(self.auth.clone(), self.store.clone());
        match &self.verifier {
            Some(verifier) => manager.with_token_verifier(verifier.clone()),
            None => manager,
        }
    }

    /// Store access for visitors without a session.
    pub fn public_repository(&self) -> Repository {
        Repository::new(self.store.clone())
    }
}

// ===== Requests =====

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ContactRequestBody {
    pub message: String,
}

// Request types with conversation_id support
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

// ===== Payloads =====

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum SessionStatus {
    SignedIn,
    ConfirmationPending,
    ProfileMissing,
    ProfileUnavailable,
    SignedOut,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct SessionPayload {
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer: Option<Employer>,
}

impl SessionPayload {
    pub fn from_state(state: &SessionState) -> Self {
        let status = match state {
            SessionState::ProfileReady { .. } => SessionStatus::SignedIn,
            SessionState::ProfileLoadFailed {
                reason: crate::session::ProfileLoadError::Missing,
                ..
            } => SessionStatus::ProfileMissing,
            SessionState::ProfileLoadFailed { .. } | SessionState::LoadingProfile { .. } => {
                SessionStatus::ProfileUnavailable
            }
            SessionState::Unknown | SessionState::LoggedOut => SessionStatus::SignedOut,
        };

        Self {
            status,
            access_token: state.session().map(|s| s.access_token.clone()),
            user: state.session().map(|s| s.user.clone()),
            employer: state.employer().cloned(),
        }
    }

    pub fn confirmation_pending() -> Self {
        Self {
            status: SessionStatus::ConfirmationPending,
            access_token: None,
            user: None,
            employer: None,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct WorkerListing {
    pub workers: Vec<WorkerCard>,
    pub total: usize,
    pub shortlisted: usize,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ShortlistToggle {
    pub worker_id: String,
    pub outcome: ToggleOutcome,
    pub shortlisted: bool,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ContactReceipt {
    pub worker_id: String,
    pub status: ContactStatus,
    /// How long the front end keeps the confirmation visible
    pub confirmation_ms: u64,
}

// ===== Response Envelopes =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }

    /// Form-level error text plus the session error's code
    pub fn from_session_error(error: &SessionError, conversation_id: Option<String>) -> Self {
        let suggestions = match error {
            SessionError::Validation(_) => vec!["Correct the highlighted field".to_string()],
            SessionError::NotSignedIn => vec!["Sign in and try again".to_string()],
            _ => vec!["Try again in a few moments".to_string()],
        };
        Self::new(
            error.message(),
            error.code().to_string(),
            suggestions,
            conversation_id,
        )
    }
}
