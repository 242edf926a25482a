// src/types/response.rs
//! Wire types for the hosted auth API and store error bodies

use serde::{Deserialize, Serialize};

// ===== Auth Types =====

/// Authenticated principal as returned by the auth API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// An active session. The access token scopes every table request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Sign-up returns a session when no email confirmation is pending,
/// otherwise only the created principal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// The signup endpoint answers with either a session or a bare user object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

impl From<SignUpResponse> for SignUpOutcome {
    fn from(response: SignUpResponse) -> Self {
        match response {
            SignUpResponse::Session(session) => Self {
                user: session.user.clone(),
                session: Some(session),
            },
            SignUpResponse::User(user) => Self {
                user,
                session: None,
            },
        }
    }
}

// ===== Error Bodies =====

/// Error body shared by the table and auth APIs; each service uses different keys.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RemoteErrorBody {
    pub code: Option<serde_json::Value>,
    pub message: Option<String>,
    pub msg: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
}

impl RemoteErrorBody {
    pub fn text(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }

    pub fn code(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signup_response_with_session() {
        let body = json!({
            "access_token": "tok",
            "refresh_token": "ref",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": { "id": "u1", "email": "a@b.co" }
        });
        let outcome: SignUpOutcome = serde_json::from_value::<SignUpResponse>(body)
            .unwrap()
            .into();
        assert_eq!(outcome.user.id, "u1");
        assert_eq!(outcome.session.unwrap().access_token, "tok");
    }

    #[test]
    fn signup_response_without_session() {
        let body = json!({ "id": "u2", "email": "c@d.co", "aud": "authenticated" });
        let outcome: SignUpOutcome = serde_json::from_value::<SignUpResponse>(body)
            .unwrap()
            .into();
        assert_eq!(outcome.user.id, "u2");
        assert!(outcome.session.is_none());
    }

    #[test]
    fn error_body_prefers_message_then_msg_then_description() {
        let rest: RemoteErrorBody = serde_json::from_value(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        }))
        .unwrap();
        assert_eq!(rest.code().as_deref(), Some("23505"));
        assert!(rest.text().unwrap().starts_with("duplicate key"));

        let auth: RemoteErrorBody = serde_json::from_value(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        }))
        .unwrap();
        assert_eq!(auth.text().as_deref(), Some("Invalid login credentials"));

        let gotrue: RemoteErrorBody =
            serde_json::from_value(json!({ "code": 422, "msg": "User already registered" }))
                .unwrap();
        assert_eq!(gotrue.code().as_deref(), Some("422"));
        assert_eq!(gotrue.text().as_deref(), Some("User already registered"));
    }
}
