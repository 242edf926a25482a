// src/core/store.rs
//! Remote store seams: the table API, the auth API and a typed repository over them

use rocket::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::app_log;
use crate::core::query::{Filter, Query, Table};
use crate::types::{
    AuthSession, AuthUser, Employer, EmployerContactUpdate, Faq, NewContactRequest, NewEmployer,
    NewShortlistEntry, ShortlistedWorkerId, SignUpOutcome, WorkExperience, Worker,
    WorkerLanguage, WorkerLanguageName, WorkerReference, WorkerSkill,
};

// ===== Errors =====

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Transport(String),
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },
    Decode(String),
    MultipleRows { table: Table },
}

impl StoreError {
    /// Unique-constraint violation reported by the database
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Rejected { code: Some(code), .. } if code == "23505")
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Transport(message) => write!(f, "store unreachable: {}", message),
            StoreError::Rejected {
                status, message, ..
            } => write!(f, "store rejected request ({}): {}", status, message),
            StoreError::Decode(message) => write!(f, "unexpected store response: {}", message),
            StoreError::MultipleRows { table } => {
                write!(f, "expected at most one row from {}", table)
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Provider refused the request; the text is shown to the user as-is.
    Rejected { status: u16, message: String },
    Transport(String),
    Decode(String),
    MissingUser,
}

impl AuthError {
    /// The token was refused because it is already expired, revoked or unknown.
    pub fn is_invalid_session(&self) -> bool {
        matches!(self, AuthError::Rejected { status: 401 | 403 | 404, .. })
    }

    pub fn message(&self) -> String {
        match self {
            AuthError::Rejected { message, .. } => message.clone(),
            AuthError::Transport(_) | AuthError::Decode(_) => {
                "Authentication service unavailable".to_string()
            }
            AuthError::MissingUser => "User creation failed".to_string(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Rejected { message, .. } => f.write_str(message),
            AuthError::Transport(message) => write!(f, "auth service unreachable: {}", message),
            AuthError::Decode(message) => write!(f, "unexpected auth response: {}", message),
            AuthError::MissingUser => f.write_str("User creation failed"),
        }
    }
}

impl std::error::Error for AuthError {}

// ===== Backend Traits =====

/// Table-oriented access to the hosted database. Every call targets one table.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Insert one row and return it as stored.
    async fn insert(&self, table: Table, row: Value) -> Result<Value, StoreError>;

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        changes: Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Delete matching rows, returning how many were removed when known.
    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize, StoreError>;

    /// Same store acting on behalf of the principal owning `access_token`.
    fn with_access_token(&self, access_token: &str) -> Arc<dyn RemoteStore>;
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;
}

// ===== Typed Repository =====

/// Typed operations over a `RemoteStore`, one per query the views issue.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn RemoteStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Rows that do not decode are logged and skipped.
    async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        let rows = self.store.select(query).await?;
        let total = rows.len();
        let decoded: Vec<T> = rows.into_iter().filter_map(|row| decode(row).ok()).collect();
        if decoded.len() < total {
            app_log!(
                warn,
                "Skipped {} of {} rows from {}",
                total - decoded.len(),
                total,
                query.table
            );
        }
        Ok(decoded)
    }

    /// Zero rows is `None`, more than one is an error.
    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        query: &Query,
    ) -> Result<Option<T>, StoreError> {
        let mut rows = self.store.select(query).await?;
        match rows.len() {
            0 => Ok(None),
            1 => decode(rows.remove(0)).map(Some),
            _ => Err(StoreError::MultipleRows { table: query.table }),
        }
    }

    async fn insert_row<P: Serialize, T: DeserializeOwned>(
        &self,
        table: Table,
        payload: &P,
    ) -> Result<T, StoreError> {
        let row = encode(payload)?;
        let stored = self.store.insert(table, row).await?;
        decode(stored)
    }

    // ----- employers -----

    pub async fn employer_by_user(&self, user_id: &str) -> Result<Option<Employer>, StoreError> {
        self.fetch_optional(&Query::table(Table::Employers).eq("user_id", user_id))
            .await
    }

    pub async fn insert_employer(&self, employer: &NewEmployer) -> Result<Employer, StoreError> {
        self.insert_row(Table::Employers, employer).await
    }

    pub async fn update_employer(
        &self,
        employer_id: &str,
        changes: &EmployerContactUpdate,
    ) -> Result<Employer, StoreError> {
        let mut rows = self
            .store
            .update(
                Table::Employers,
                &[Filter::eq("id", employer_id)],
                encode(changes)?,
            )
            .await?;
        match rows.len() {
            1 => decode(rows.remove(0)),
            0 => Err(StoreError::Rejected {
                status: 404,
                code: None,
                message: format!("employer {} not found", employer_id),
            }),
            _ => Err(StoreError::MultipleRows {
                table: Table::Employers,
            }),
        }
    }

    // ----- workers -----

    /// All workers, newest first
    pub async fn list_workers(&self) -> Result<Vec<Worker>, StoreError> {
        self.fetch(&Query::table(Table::Workers).order_desc("created_at"))
            .await
    }

    pub async fn find_worker(&self, worker_id: &str) -> Result<Option<Worker>, StoreError> {
        self.fetch_optional(&Query::table(Table::Workers).eq("id", worker_id))
            .await
    }

    pub async fn featured_workers(&self) -> Result<Vec<Worker>, StoreError> {
        self.fetch(
            &Query::table(Table::Workers)
                .eq("is_featured", true)
                .order_asc("full_name"),
        )
        .await
    }

    pub async fn work_experience(
        &self,
        worker_id: &str,
    ) -> Result<Vec<WorkExperience>, StoreError> {
        self.fetch(
            &Query::table(Table::WorkExperience)
                .eq("worker_id", worker_id)
                .order_desc("start_date"),
        )
        .await
    }

    pub async fn languages(&self, worker_id: &str) -> Result<Vec<WorkerLanguage>, StoreError> {
        self.fetch(&Query::table(Table::WorkerLanguages).eq("worker_id", worker_id))
            .await
    }

    /// One batched query for the languages of several workers
    pub async fn languages_for(
        &self,
        worker_ids: &[String],
    ) -> Result<Vec<WorkerLanguageName>, StoreError> {
        if worker_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(
            &Query::table(Table::WorkerLanguages)
                .columns("worker_id,language")
                .is_in("worker_id", worker_ids.iter().cloned()),
        )
        .await
    }

    pub async fn skills(&self, worker_id: &str) -> Result<Vec<WorkerSkill>, StoreError> {
        self.fetch(&Query::table(Table::WorkerSkills).eq("worker_id", worker_id))
            .await
    }

    pub async fn references(&self, worker_id: &str) -> Result<Vec<WorkerReference>, StoreError> {
        self.fetch(&Query::table(Table::WorkerReferences).eq("worker_id", worker_id))
            .await
    }

    // ----- shortlist -----

    pub async fn shortlisted_ids(&self, employer_id: &str) -> Result<Vec<String>, StoreError> {
        let rows: Vec<ShortlistedWorkerId> = self
            .fetch(
                &Query::table(Table::ShortlistedWorkers)
                    .columns("worker_id")
                    .eq("employer_id", employer_id),
            )
            .await?;
        Ok(rows.into_iter().map(|row| row.worker_id).collect())
    }

    pub async fn insert_shortlist(
        &self,
        employer_id: &str,
        worker_id: &str,
    ) -> Result<(), StoreError> {
        let entry = NewShortlistEntry {
            employer_id: employer_id.to_string(),
            worker_id: worker_id.to_string(),
            notes: None,
        };
        self.store
            .insert(Table::ShortlistedWorkers, encode(&entry)?)
            .await
            .map(|_| ())
    }

    pub async fn delete_shortlist(
        &self,
        employer_id: &str,
        worker_id: &str,
    ) -> Result<(), StoreError> {
        self.store
            .delete(
                Table::ShortlistedWorkers,
                &[
                    Filter::eq("employer_id", employer_id),
                    Filter::eq("worker_id", worker_id),
                ],
            )
            .await
            .map(|_| ())
    }

    // ----- contact requests & faqs -----

    pub async fn insert_contact_request(
        &self,
        request: &NewContactRequest,
    ) -> Result<(), StoreError> {
        self.store
            .insert(Table::ContactRequests, encode(request)?)
            .await
            .map(|_| ())
    }

    pub async fn active_faqs(&self) -> Result<Vec<Faq>, StoreError> {
        self.fetch(
            &Query::table(Table::Faqs)
                .eq("is_active", true)
                .order_asc("display_order"),
        )
        .await
    }
}

fn encode<P: Serialize>(payload: &P) -> Result<Value, StoreError> {
    serde_json::to_value(payload).map_err(|e| StoreError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|e| {
        app_log!(warn, "Row did not match expected shape: {}", e);
        StoreError::Decode(e.to_string())
    })
}
