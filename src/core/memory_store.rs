// src/core/memory_store.rs
//! In-process backend with the same table and auth semantics as the hosted one.
//! Used by tests and the offline demo.

use chrono::Utc;
use rocket::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::query::{Filter, Query, Table};
use crate::core::store::{AuthBackend, AuthError, RemoteStore, StoreError};
use crate::types::{AuthSession, AuthUser, SignUpOutcome};

const UNIQUE_VIOLATION: &str = "23505";
const MIN_PASSWORD_LEN: usize = 6;

/// Operation kinds that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<Table, Vec<Value>>,
    users: HashMap<String, (String, String)>,
    sessions: HashMap<String, String>,
    failures: HashSet<(Table, Operation)>,
    auth_failure: Option<String>,
    calls: usize,
    table_calls: Vec<(Table, Operation, Option<String>)>,
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    /// Principal this handle acts for; `None` is the anonymous store.
    access_token: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a row directly, bypassing constraints and failure injection.
    pub fn seed(&self, table: Table, row: Value) {
        let mut state = self.lock();
        state.tables.entry(table).or_default().push(row);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock().tables.get(&table).cloned().unwrap_or_default()
    }

    /// Make every `operation` on `table` fail until `recover` is called.
    pub fn fail(&self, table: Table, operation: Operation) {
        self.lock().failures.insert((table, operation));
    }

    pub fn recover(&self, table: Table, operation: Operation) {
        self.lock().failures.remove(&(table, operation));
    }

    /// Make every auth call fail with `message`.
    pub fn fail_auth(&self, message: &str) {
        self.lock().auth_failure = Some(message.to_string());
    }

    /// Number of table and auth calls received so far.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    pub fn is_session_active(&self, access_token: &str) -> bool {
        self.lock().sessions.contains_key(access_token)
    }

    pub fn active_sessions(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Access token each call on `table` was scoped to, in call order.
    pub fn scopes(&self, table: Table, operation: Operation) -> Vec<Option<String>> {
        self.lock()
            .table_calls
            .iter()
            .filter(|(t, op, _)| *t == table && *op == operation)
            .map(|(_, _, token)| token.clone())
            .collect()
    }

    fn start(
        &self,
        table: Table,
        operation: Operation,
    ) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let mut state = self.lock();
        state.calls += 1;
        state
            .table_calls
            .push((table, operation, self.access_token.clone()));
        if state.failures.contains(&(table, operation)) {
            return Err(StoreError::Rejected {
                status: 503,
                code: None,
                message: format!("{:?} on {} failed", operation, table),
            });
        }
        Ok(state)
    }

    fn start_auth(&self) -> Result<MutexGuard<'_, MemoryState>, AuthError> {
        let mut state = self.lock();
        state.calls += 1;
        if let Some(message) = state.auth_failure.clone() {
            return Err(AuthError::Rejected {
                status: 503,
                message,
            });
        }
        Ok(state)
    }
}

fn with_defaults(table: Table, row: Value) -> Value {
    let now = Utc::now().to_rfc3339();
    let mut object = match row {
        Value::Object(object) => object,
        _ => serde_json::Map::new(),
    };

    let mut default = |key: &str, value: Value| {
        object.entry(key.to_string()).or_insert(value);
    };
    default("id", json!(uuid::Uuid::new_v4().to_string()));
    default("created_at", json!(now));

    match table {
        Table::Employers => {
            default("updated_at", json!(now));
            default("company_verified", json!(false));
            default("role", json!("recruiter"));
        }
        Table::Workers => {
            default("updated_at", json!(now));
            default("is_featured", json!(false));
        }
        Table::ContactRequests => default("status", json!("pending")),
        Table::Faqs => default("is_active", json!(true)),
        _ => {}
    }

    Value::Object(object)
}

fn unique_key(table: Table, row: &Value) -> Option<Vec<Value>> {
    let columns: &[&str] = match table {
        Table::ShortlistedWorkers => &["employer_id", "worker_id"],
        Table::Employers => &["user_id"],
        _ => return None,
    };
    Some(
        columns
            .iter()
            .map(|column| row.get(*column).cloned().unwrap_or(Value::Null))
            .collect(),
    )
}

#[async_trait]
impl RemoteStore for MemoryBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let state = self.start(query.table, Operation::Select)?;
        let rows = state.tables.get(&query.table).map(Vec::as_slice).unwrap_or(&[]);
        Ok(query.apply(rows))
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, StoreError> {
        let mut state = self.start(table, Operation::Insert)?;
        let row = with_defaults(table, row);
        let rows = state.tables.entry(table).or_default();

        if let Some(key) = unique_key(table, &row) {
            let taken = rows
                .iter()
                .any(|existing| unique_key(table, existing).as_ref() == Some(&key));
            if taken {
                return Err(StoreError::Rejected {
                    status: 409,
                    code: Some(UNIQUE_VIOLATION.to_string()),
                    message: format!(
                        "duplicate key value violates unique constraint on {}",
                        table
                    ),
                });
            }
        }

        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        changes: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let mut state = self.start(table, Operation::Update)?;
        let now = json!(Utc::now().to_rfc3339());
        let mut updated = Vec::new();

        for row in state.tables.entry(table).or_default().iter_mut() {
            if !filters.iter().all(|filter| filter.matches(row)) {
                continue;
            }
            if let (Value::Object(target), Value::Object(fields)) = (&mut *row, &changes) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
                if target.contains_key("updated_at") {
                    target.insert("updated_at".to_string(), now.clone());
                }
            }
            updated.push(row.clone());
        }

        Ok(updated)
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize, StoreError> {
        let mut state = self.start(table, Operation::Delete)?;
        let rows = state.tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| !filters.iter().all(|filter| filter.matches(row)));
        Ok(before - rows.len())
    }

    fn with_access_token(&self, access_token: &str) -> Arc<dyn RemoteStore> {
        Arc::new(Self {
            state: self.state.clone(),
            access_token: Some(access_token.to_string()),
        })
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let mut state = self.start_auth()?;
        if state.users.contains_key(email) {
            return Err(AuthError::Rejected {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Rejected {
                status: 422,
                message: "Password should be at least 6 characters.".to_string(),
            });
        }

        let user_id = uuid::Uuid::new_v4().to_string();
        state
            .users
            .insert(email.to_string(), (user_id.clone(), password.to_string()));

        let user = AuthUser {
            id: user_id.clone(),
            email: Some(email.to_string()),
        };
        let access_token = uuid::Uuid::new_v4().to_string();
        state.sessions.insert(access_token.clone(), user_id);

        Ok(SignUpOutcome {
            user: user.clone(),
            session: Some(AuthSession {
                access_token,
                refresh_token: None,
                expires_in: Some(3600),
                user,
            }),
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let mut state = self.start_auth()?;
        let user_id = match state.users.get(email) {
            Some((user_id, stored)) if stored == password => user_id.clone(),
            _ => {
                return Err(AuthError::Rejected {
                    status: 400,
                    message: "Invalid login credentials".to_string(),
                })
            }
        };

        let access_token = uuid::Uuid::new_v4().to_string();
        state.sessions.insert(access_token.clone(), user_id.clone());

        Ok(AuthSession {
            access_token,
            refresh_token: None,
            expires_in: Some(3600),
            user: AuthUser {
                id: user_id,
                email: Some(email.to_string()),
            },
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let mut state = self.start_auth()?;
        state.sessions.remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let state = self.start_auth()?;
        let user_id = state
            .sessions
            .get(access_token)
            .cloned()
            .ok_or_else(|| AuthError::Rejected {
                status: 401,
                message: "Invalid JWT".to_string(),
            })?;
        let email = state
            .users
            .iter()
            .find(|(_, (id, _))| *id == user_id)
            .map(|(email, _)| email.clone());
        Ok(AuthUser { id: user_id, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_fills_defaults_and_enforces_shortlist_uniqueness() {
        let backend = MemoryBackend::new();
        let entry = json!({ "employer_id": "e1", "worker_id": "w1" });

        let stored = backend
            .insert(Table::ShortlistedWorkers, entry.clone())
            .await
            .unwrap();
        assert!(stored["id"].is_string());
        assert!(stored["created_at"].is_string());

        let err = backend
            .insert(Table::ShortlistedWorkers, entry)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(backend.rows(Table::ShortlistedWorkers).len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_only_matching_rows() {
        let backend = MemoryBackend::new();
        for employer in ["e1", "e2"] {
            backend.seed(
                Table::ShortlistedWorkers,
                json!({ "employer_id": employer, "worker_id": "w1" }),
            );
        }

        let removed = backend
            .delete(
                Table::ShortlistedWorkers,
                &[Filter::eq("employer_id", "e1"), Filter::eq("worker_id", "w1")],
            )
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(backend.rows(Table::ShortlistedWorkers)[0]["employer_id"], "e2");
    }

    #[tokio::test]
    async fn injected_failures_are_reported_until_recovered() {
        let backend = MemoryBackend::new();
        backend.fail(Table::Faqs, Operation::Select);
        assert!(backend.select(&Query::table(Table::Faqs)).await.is_err());

        backend.recover(Table::Faqs, Operation::Select);
        assert!(backend.select(&Query::table(Table::Faqs)).await.is_ok());
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn scoped_handles_record_their_token() {
        let backend = MemoryBackend::new();
        let scoped = backend.with_access_token("tok-1");

        backend.select(&Query::table(Table::Faqs)).await.unwrap();
        scoped.select(&Query::table(Table::Faqs)).await.unwrap();

        assert_eq!(
            backend.scopes(Table::Faqs, Operation::Select),
            vec![None, Some("tok-1".to_string())]
        );
        assert!(backend.scopes(Table::Faqs, Operation::Insert).is_empty());
    }

    #[tokio::test]
    async fn auth_round_trip_tracks_sessions() {
        let backend = MemoryBackend::new();
        let outcome = backend.sign_up("hr@acme.test", "secret1").await.unwrap();
        let token = outcome.session.unwrap().access_token;
        assert!(backend.is_session_active(&token));

        let duplicate = backend.sign_up("hr@acme.test", "secret1").await.unwrap_err();
        assert_eq!(duplicate.message(), "User already registered");

        let bad = backend
            .sign_in_with_password("hr@acme.test", "wrong!!")
            .await
            .unwrap_err();
        assert_eq!(bad.message(), "Invalid login credentials");

        let user = backend.get_user(&token).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("hr@acme.test"));

        backend.sign_out(&token).await.unwrap();
        assert!(!backend.is_session_active(&token));
        assert!(backend.get_user(&token).await.is_err());
    }
}
