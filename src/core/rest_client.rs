// src/core/rest_client.rs
//! HTTP client for the hosted backend: PostgREST tables under `/rest/v1`,
//! auth under `/auth/v1`. Requests are not retried.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode};
use rocket::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::app_log;
use crate::core::query::{Filter, Query, Table};
use crate::core::store::{AuthBackend, AuthError, RemoteStore, StoreError};
use crate::types::response::{RemoteErrorBody, SignUpResponse};
use crate::types::{AuthSession, AuthUser, SignUpOutcome};

const REST_PATH: &str = "/rest/v1";
const SIGNUP_ENDPOINT: &str = "/auth/v1/signup";
const TOKEN_ENDPOINT: &str = "/auth/v1/token?grant_type=password";
const LOGOUT_ENDPOINT: &str = "/auth/v1/logout";
const USER_ENDPOINT: &str = "/auth/v1/user";

#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str, timeout_seconds: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(anon_key).context("Anon key is not a valid header value")?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
        })
    }

    /// Same client, sending `access_token` instead of the anon key as bearer.
    pub fn authorized(&self, access_token: &str) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
            ..self.clone()
        }
    }

    fn bearer(&self) -> String {
        format!(
            "Bearer {}",
            self.access_token.as_deref().unwrap_or(&self.anon_key)
        )
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}{}/{}", self.base_url, REST_PATH, table.name())
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn table_request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORIZATION, self.bearer())
    }

    async fn send_table(
        &self,
        table: Table,
        builder: RequestBuilder,
    ) -> Result<Response, StoreError> {
        let response = self
            .table_request(builder)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        app_log!(trace, "{} responded with {}", table, status);

        if status.is_success() {
            Ok(response)
        } else {
            let body = read_error_body(response).await;
            app_log!(error, "Store error on {}: {} {:?}", table, status, body.text());
            Err(StoreError::Rejected {
                status: status.as_u16(),
                code: body.code(),
                message: body
                    .text()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            })
        }
    }

    async fn rows(response: Response) -> Result<Vec<Value>, StoreError> {
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn send_auth(&self, builder: RequestBuilder) -> Result<Response, AuthError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = read_error_body(response).await;
        let message = body
            .text()
            .unwrap_or_else(|| format!("Authentication failed ({})", status));
        app_log!(warn, "Auth request rejected with {}: {}", status, message);
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

async fn read_error_body(response: Response) -> RemoteErrorBody {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or_else(|_| RemoteErrorBody {
        message: (!text.is_empty()).then_some(text),
        ..Default::default()
    })
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| (filter.column().to_string(), filter.to_param()))
        .collect()
}

#[async_trait]
impl RemoteStore for SupabaseClient {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .client
            .get(self.table_url(query.table))
            .query(&query.to_params());
        let response = self.send_table(query.table, builder).await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, StoreError> {
        let builder = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row);
        let response = self.send_table(table, builder).await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        changes: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .client
            .patch(self.table_url(table))
            .query(&filter_params(filters))
            .header("Prefer", "return=representation")
            .json(&changes);
        let response = self.send_table(table, builder).await?;
        Self::rows(response).await
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize, StoreError> {
        let builder = self
            .client
            .delete(self.table_url(table))
            .query(&filter_params(filters))
            .header("Prefer", "return=representation");
        let response = self.send_table(table, builder).await?;
        Ok(Self::rows(response).await?.len())
    }

    fn with_access_token(&self, access_token: &str) -> Arc<dyn RemoteStore> {
        Arc::new(self.authorized(access_token))
    }
}

#[async_trait]
impl AuthBackend for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        app_log!(info, "Creating auth principal for {}", email);
        let builder = self
            .client
            .post(self.auth_url(SIGNUP_ENDPOINT))
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
            .json(&json!({ "email": email, "password": password }));
        let response = self.send_auth(builder).await?;
        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))?;
        Ok(body.into())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let builder = self
            .client
            .post(self.auth_url(TOKEN_ENDPOINT))
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
            .json(&json!({ "email": email, "password": password }));
        let response = self.send_auth(builder).await?;
        response
            .json::<AuthSession>()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let builder = self
            .client
            .post(self.auth_url(LOGOUT_ENDPOINT))
            .header(AUTHORIZATION, format!("Bearer {}", access_token));
        match self.send_auth(builder).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_invalid_session() => {
                app_log!(info, "Sign-out on an expired or revoked session");
                Ok(())
            }
            Err(e) => {
                app_log!(error, "Sign-out failed, session may still be active: {}", e);
                Err(e)
            }
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let builder = self
            .client
            .get(self.auth_url(USER_ENDPOINT))
            .header(AUTHORIZATION, format!("Bearer {}", access_token));
        let response = self.send_auth(builder).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Err(AuthError::MissingUser);
        }
        response
            .json::<AuthUser>()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))
    }
}
