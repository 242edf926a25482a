// src/session.rs
//! Session/profile manager: the single writer of the current principal and
//! its employer profile. Readers observe it through a watch channel.

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::app_log;
use crate::auth::TokenVerifier;
use crate::core::store::{AuthBackend, AuthError, RemoteStore, Repository, StoreError};
use crate::types::{
    AuthSession, AuthUser, Employer, EmployerContactUpdate, EmployerRole, NewEmployer,
};

pub const MIN_PASSWORD_LEN: usize = 6;

// ===== State =====

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileLoadError {
    /// Authenticated principal without an employer row
    Missing,
    Store(StoreError),
}

impl fmt::Display for ProfileLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileLoadError::Missing => f.write_str("no employer profile for this account"),
            ProfileLoadError::Store(err) => write!(f, "{}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unknown,
    LoggedOut,
    LoadingProfile {
        session: AuthSession,
    },
    ProfileReady {
        session: AuthSession,
        employer: Employer,
    },
    ProfileLoadFailed {
        session: AuthSession,
        reason: ProfileLoadError,
    },
}

impl SessionState {
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            SessionState::Unknown | SessionState::LoggedOut => None,
            SessionState::LoadingProfile { session }
            | SessionState::ProfileReady { session, .. }
            | SessionState::ProfileLoadFailed { session, .. } => Some(session),
        }
    }

    pub fn employer(&self) -> Option<&Employer> {
        match self {
            SessionState::ProfileReady { employer, .. } => Some(employer),
            _ => None,
        }
    }

    /// True while the top-level view cannot be chosen yet.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SessionState::Unknown | SessionState::LoadingProfile { .. }
        )
    }
}

// ===== Errors =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    PasswordMismatch,
    PasswordTooShort,
    MissingField(&'static str),
}

impl ValidationError {
    pub fn message(&self) -> String {
        match self {
            ValidationError::PasswordMismatch => "Passwords do not match".to_string(),
            ValidationError::PasswordTooShort => {
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN)
            }
            ValidationError::MissingField(field) => format!("{} is required", field),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Validation(ValidationError),
    Auth(AuthError),
    /// Principal was created but its profile was not; the session has been revoked.
    ProfileCreation(StoreError),
    NotSignedIn,
    Store(StoreError),
}

impl SessionError {
    /// Text shown at form level
    pub fn message(&self) -> String {
        match self {
            SessionError::Validation(err) => err.message(),
            SessionError::Auth(err) => err.message(),
            SessionError::ProfileCreation(_) => {
                "Failed to create employer profile. Please try again.".to_string()
            }
            SessionError::NotSignedIn => "Sign in required".to_string(),
            SessionError::Store(_) => "Failed to save changes".to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Validation(_) => "VALIDATION_ERROR",
            SessionError::Auth(_) => "AUTH_ERROR",
            SessionError::ProfileCreation(_) => "PROFILE_CREATE_ERROR",
            SessionError::NotSignedIn => "AUTHORIZATION_ERROR",
            SessionError::Store(_) => "STORE_ERROR",
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::ProfileCreation(err) => {
                write!(f, "employer profile creation failed: {}", err)
            }
            SessionError::Store(err) => write!(f, "{}", err),
            other => f.write_str(&other.message()),
        }
    }
}

impl std::error::Error for SessionError {}

// ===== Forms =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub company_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub role: Option<EmployerRole>,
}

impl SignUpForm {
    /// Local checks; nothing here touches the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.company_name.trim().is_empty() {
            return Err(ValidationError::MissingField("Company name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("Email address"));
        }
        if self.contact_email.trim().is_empty() {
            return Err(ValidationError::MissingField("Company contact email"));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(())
    }

    fn profile_for(&self, user_id: &str) -> NewEmployer {
        NewEmployer {
            user_id: user_id.to_string(),
            company_name: self.company_name.trim().to_string(),
            contact_email: self.contact_email.trim().to_string(),
            contact_phone: self
                .contact_phone
                .as_deref()
                .map(str::trim)
                .filter(|phone| !phone.is_empty())
                .map(str::to_string),
            role: self.role.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpStatus {
    /// Account and profile exist and a session is active.
    SignedIn,
    /// Account and profile exist; the provider wants the email confirmed first.
    ConfirmationPending,
}

// ===== Manager =====

pub struct SessionManager {
    auth: Arc<dyn AuthBackend>,
    store: Arc<dyn RemoteStore>,
    verifier: Option<Arc<TokenVerifier>>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthBackend>, store: Arc<dyn RemoteStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            auth,
            store,
            verifier: None,
            state,
        }
    }

    /// Validate restored access tokens locally instead of asking the auth API.
    pub fn with_token_verifier(mut self, verifier: Arc<TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.state.borrow().session().cloned()
    }

    pub fn employer(&self) -> Option<Employer> {
        self.state.borrow().employer().cloned()
    }

    /// Store scoped to the current principal, or the anonymous store.
    pub fn store(&self) -> Arc<dyn RemoteStore> {
        match self.state.borrow().session() {
            Some(session) => self.store.with_access_token(&session.access_token),
            None => self.store.clone(),
        }
    }

    pub fn repository(&self) -> Repository {
        Repository::new(self.store())
    }

    /// Resolve a previously issued access token, if any, and load its profile.
    pub async fn initialize(&self, access_token: Option<&str>) -> SessionState {
        let session = match access_token {
            None => None,
            Some(token) => match self.resolve_user(token).await {
                Ok(user) => Some(AuthSession {
                    access_token: token.to_string(),
                    refresh_token: None,
                    expires_in: None,
                    user,
                }),
                Err(e) => {
                    app_log!(warn, "Stored session rejected: {}", e);
                    None
                }
            },
        };

        self.on_session_change(session).await;
        self.state()
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpStatus, SessionError> {
        form.validate().map_err(SessionError::Validation)?;

        let outcome = self
            .auth
            .sign_up(form.email.trim(), &form.password)
            .await
            .map_err(SessionError::Auth)?;

        let store = match &outcome.session {
            Some(session) => self.store.with_access_token(&session.access_token),
            None => self.store.clone(),
        };
        let profile = form.profile_for(&outcome.user.id);

        if let Err(e) = Repository::new(store).insert_employer(&profile).await {
            app_log!(
                error,
                "Employer profile creation failed for {}: {}",
                outcome.user.id,
                e
            );
            if let Some(session) = &outcome.session {
                if let Err(revoke) = self.auth.sign_out(&session.access_token).await {
                    app_log!(error, "Failed to revoke orphaned session: {}", revoke);
                }
            }
            self.on_session_change(None).await;
            return Err(SessionError::ProfileCreation(e));
        }

        app_log!(
            info,
            "Employer account created for {} ({})",
            profile.company_name,
            outcome.user.id
        );

        match outcome.session {
            Some(session) => {
                self.on_session_change(Some(session)).await;
                Ok(SignUpStatus::SignedIn)
            }
            None => Ok(SignUpStatus::ConfirmationPending),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let session = self
            .auth
            .sign_in_with_password(email.trim(), password)
            .await
            .map_err(SessionError::Auth)?;

        app_log!(info, "Principal {} signed in", session.user.id);
        self.on_session_change(Some(session)).await;
        Ok(())
    }

    /// Revoke the remote session and always clear local state.
    pub async fn sign_out(&self) {
        if let Some(session) = self.session() {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                app_log!(error, "Failed to revoke session remotely: {}", e);
            }
        }
        self.on_session_change(None).await;
    }

    /// Write contact or role changes; the local profile follows only a confirmed write.
    pub async fn update_contact(
        &self,
        changes: &EmployerContactUpdate,
    ) -> Result<Employer, SessionError> {
        let (session, employer) = match self.state() {
            SessionState::ProfileReady { session, employer } => (session, employer),
            _ => return Err(SessionError::NotSignedIn),
        };

        if changes.is_empty() {
            return Ok(employer);
        }

        let updated = self
            .repository()
            .update_employer(&employer.id, changes)
            .await
            .map_err(|e| {
                app_log!(error, "Failed to update employer {}: {}", employer.id, e);
                SessionError::Store(e)
            })?;

        self.state.send_replace(SessionState::ProfileReady {
            session,
            employer: updated.clone(),
        });
        Ok(updated)
    }

    async fn resolve_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        match &self.verifier {
            Some(verifier) => verifier.verify(access_token),
            None => self.auth.get_user(access_token).await,
        }
    }

    /// The only place the profile is (re)loaded or cleared.
    async fn on_session_change(&self, session: Option<AuthSession>) {
        let session = match session {
            Some(session) => session,
            None => {
                self.state.send_replace(SessionState::LoggedOut);
                return;
            }
        };

        self.state.send_replace(SessionState::LoadingProfile {
            session: session.clone(),
        });

        let repository = Repository::new(self.store.with_access_token(&session.access_token));
        let next = match repository.employer_by_user(&session.user.id).await {
            Ok(Some(employer)) => SessionState::ProfileReady { session, employer },
            Ok(None) => {
                app_log!(warn, "No employer profile for principal {}", session.user.id);
                SessionState::ProfileLoadFailed {
                    session,
                    reason: ProfileLoadError::Missing,
                }
            }
            Err(e) => {
                app_log!(error, "Error loading employer profile: {}", e);
                SessionState::ProfileLoadFailed {
                    session,
                    reason: ProfileLoadError::Store(e),
                }
            }
        };

        self.state.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SignUpForm {
        SignUpForm {
            email: "hr@acme.test".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            company_name: "Acme".to_string(),
            contact_email: "contact@acme.test".to_string(),
            contact_phone: Some("  ".to_string()),
            role: None,
        }
    }

    #[test]
    fn validate_reports_mismatch_before_length() {
        let mut f = form();
        f.password = "abc".to_string();
        f.confirm_password = "abd".to_string();
        assert_eq!(f.validate(), Err(ValidationError::PasswordMismatch));
        assert_eq!(
            ValidationError::PasswordMismatch.message(),
            "Passwords do not match"
        );

        f.confirm_password = "abc".to_string();
        assert_eq!(f.validate(), Err(ValidationError::PasswordTooShort));
        assert_eq!(
            ValidationError::PasswordTooShort.message(),
            "Password must be at least 6 characters"
        );
    }

    #[test]
    fn profile_defaults_role_and_drops_blank_phone() {
        let profile = form().profile_for("u1");
        assert_eq!(profile.role, EmployerRole::Recruiter);
        assert_eq!(profile.contact_phone, None);
        assert_eq!(profile.user_id, "u1");
    }

    #[test]
    fn state_accessors() {
        assert!(SessionState::Unknown.is_pending());
        assert!(!SessionState::LoggedOut.is_pending());
        assert!(SessionState::LoggedOut.session().is_none());
    }
}
