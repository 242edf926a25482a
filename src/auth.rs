// src/auth.rs
use crate::app_log;
use crate::core::store::AuthError;
use crate::session::{ProfileLoadError, SessionManager, SessionState};
use crate::types::{AuthSession, AuthUser, Employer};
use crate::web::ServerState;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};

const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Claims carried by access tokens issued by the hosted auth service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // principal id
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}

/// Local HS256 verification with the project's JWT secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
        Self {
            key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| AuthError::Rejected {
                status: 401,
                message: format!("Invalid JWT: {}", e),
            })
    }
}

fn bearer_token<'r>(req: &'r Request<'_>) -> Result<Option<&'r str>, AuthGuardError> {
    match req.headers().get_one("Authorization") {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
            _ => {
                app_log!(warn, "Invalid Authorization header format");
                Err(AuthGuardError::InvalidToken)
            }
        },
        None => Ok(None),
    }
}

/// Signed-in employer with a loaded profile
pub struct AuthenticatedEmployer {
    pub session: AuthSession,
    pub employer: Employer,
    pub manager: SessionManager,
}

impl AuthenticatedEmployer {
    pub fn employer(&self) -> &Employer {
        &self.employer
    }

    pub fn employer_id(&self) -> &str {
        &self.employer.id
    }

    pub fn company_name(&self) -> &str {
        &self.employer.company_name
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedEmployer {
    type Error = AuthGuardError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let state = match req.guard::<&State<ServerState>>().await {
            Outcome::Success(state) => state,
            Outcome::Error((status, _)) => {
                return Outcome::Error((status, AuthGuardError::ServerMisconfigured))
            }
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match bearer_token(req) {
            Ok(Some(token)) => token,
            Ok(None) => {
                app_log!(warn, "Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthGuardError::MissingToken));
            }
            Err(e) => return Outcome::Error((Status::Unauthorized, e)),
        };

        let manager = state.session_manager();
        match manager.initialize(Some(token)).await {
            SessionState::ProfileReady { session, employer } => {
                app_log!(
                    info,
                    "Employer {} authenticated for {}",
                    employer.id,
                    employer.company_name
                );
                Outcome::Success(AuthenticatedEmployer {
                    session,
                    employer,
                    manager,
                })
            }
            SessionState::ProfileLoadFailed {
                reason: ProfileLoadError::Missing,
                ..
            } => Outcome::Error((Status::Forbidden, AuthGuardError::ProfileMissing)),
            SessionState::ProfileLoadFailed { reason, .. } => {
                app_log!(error, "Profile unavailable: {}", reason);
                Outcome::Error((
                    Status::InternalServerError,
                    AuthGuardError::ProfileUnavailable,
                ))
            }
            _ => Outcome::Error((
                Status::Unauthorized,
                AuthGuardError::TokenVerificationFailed,
            )),
        }
    }
}

#[derive(Debug)]
pub enum AuthGuardError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    ProfileMissing,
    ProfileUnavailable,
    ServerMisconfigured,
}

impl AuthGuardError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthGuardError::MissingToken => "Authorization token required",
            AuthGuardError::InvalidToken => "Invalid authorization token format",
            AuthGuardError::TokenVerificationFailed => "Session expired or revoked",
            AuthGuardError::ProfileMissing => "No employer profile for this account",
            AuthGuardError::ProfileUnavailable => "Employer profile could not be loaded",
            AuthGuardError::ServerMisconfigured => "Server state unavailable",
        }
    }
}

/// Raw bearer token, if the request carried a well-formed one. Never fails.
pub struct BearerToken(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BearerToken {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = bearer_token(req).ok().flatten().map(str::to_string);
        Outcome::Success(BearerToken(token))
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAuth {
    pub employer: Option<AuthenticatedEmployer>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedEmployer::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalAuth {
                employer: Some(auth),
            }),
            _ => Outcome::Success(OptionalAuth { employer: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp: usize) -> String {
        let claims = Claims {
            sub: "user-1".to_string(),
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            exp,
            email: Some("hr@acme.test".to_string()),
            role: Some("authenticated".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn verifies_tokens_signed_with_project_secret() {
        let verifier = TokenVerifier::new("project-secret");
        let user = verifier.verify(&token("project-secret", in_one_hour())).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.email.as_deref(), Some("hr@acme.test"));
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let verifier = TokenVerifier::new("project-secret");
        assert!(verifier
            .verify(&token("other-secret", in_one_hour()))
            .is_err());

        let expired = (chrono::Utc::now().timestamp() - 3600) as usize;
        assert!(verifier.verify(&token("project-secret", expired)).is_err());
    }
}
