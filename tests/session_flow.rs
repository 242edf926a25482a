mod common;

use common::{manager, seed_employer, signup_form};
use pazzle::core::{AuthBackend, MemoryBackend, Operation, Table};
use pazzle::session::{ProfileLoadError, SessionError, SessionState, SignUpStatus, ValidationError};
use pazzle::types::{EmployerContactUpdate, EmployerRole};

#[tokio::test]
async fn initialize_without_token_is_logged_out() {
    let backend = MemoryBackend::new();
    let manager = manager(&backend);
    assert_eq!(manager.state(), SessionState::Unknown);

    let state = manager.initialize(None).await;
    assert_eq!(state, SessionState::LoggedOut);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn sign_up_creates_principal_and_profile() {
    let backend = MemoryBackend::new();
    let manager = manager(&backend);

    let status = manager.sign_up(&signup_form("hr@acme.test")).await.unwrap();
    assert_eq!(status, SignUpStatus::SignedIn);

    let employers = backend.rows(Table::Employers);
    assert_eq!(employers.len(), 1);
    assert_eq!(employers[0]["role"], "recruiter");
    assert!(employers[0]["contact_phone"].is_null());

    let employer = manager.employer().unwrap();
    assert_eq!(employer.company_name, "Acme Staffing");
    assert_eq!(employer.role, EmployerRole::Recruiter);
    assert!(matches!(manager.state(), SessionState::ProfileReady { .. }));
}

#[tokio::test]
async fn mismatched_passwords_never_reach_the_network() {
    let backend = MemoryBackend::new();
    let manager = manager(&backend);

    let mut form = signup_form("hr@acme.test");
    form.confirm_password = "different".to_string();

    let err = manager.sign_up(&form).await.unwrap_err();
    assert_eq!(err, SessionError::Validation(ValidationError::PasswordMismatch));
    assert_eq!(err.message(), "Passwords do not match");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn short_password_is_rejected_locally() {
    let backend = MemoryBackend::new();
    let manager = manager(&backend);

    let mut form = signup_form("hr@acme.test");
    form.password = "abc".to_string();
    form.confirm_password = "abc".to_string();

    let err = manager.sign_up(&form).await.unwrap_err();
    assert_eq!(err.message(), "Password must be at least 6 characters");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn failed_profile_insert_revokes_the_new_session() {
    let backend = MemoryBackend::new();
    backend.fail(Table::Employers, Operation::Insert);
    let manager = manager(&backend);

    let err = manager.sign_up(&signup_form("hr@acme.test")).await.unwrap_err();

    assert!(matches!(err, SessionError::ProfileCreation(_)));
    assert_eq!(
        err.message(),
        "Failed to create employer profile. Please try again."
    );
    assert_eq!(manager.state(), SessionState::LoggedOut);
    assert_eq!(backend.active_sessions(), 0);
    assert!(backend.rows(Table::Employers).is_empty());
}

#[tokio::test]
async fn provider_errors_are_shown_verbatim() {
    let backend = MemoryBackend::new();
    let manager = manager(&backend);
    manager.sign_up(&signup_form("hr@acme.test")).await.unwrap();

    let duplicate = manager.sign_up(&signup_form("hr@acme.test")).await.unwrap_err();
    assert_eq!(duplicate.message(), "User already registered");

    let wrong = manager.sign_in("hr@acme.test", "wrong-password").await.unwrap_err();
    assert_eq!(wrong.message(), "Invalid login credentials");
}

#[tokio::test]
async fn sign_in_then_sign_out() {
    let backend = MemoryBackend::new();
    manager(&backend)
        .sign_up(&signup_form("hr@acme.test"))
        .await
        .unwrap();

    let manager = manager(&backend);
    let mut updates = manager.subscribe();
    manager.sign_in("hr@acme.test", "secret1").await.unwrap();

    assert!(updates.has_changed().unwrap());
    assert_eq!(
        updates.borrow_and_update().employer().map(|e| e.company_name.clone()),
        Some("Acme Staffing".to_string())
    );

    let token = manager.session().unwrap().access_token;
    assert!(backend.is_session_active(&token));

    manager.sign_out().await;
    assert_eq!(manager.state(), SessionState::LoggedOut);
    assert!(manager.employer().is_none());
    assert!(!backend.is_session_active(&token));
}

#[tokio::test]
async fn restored_token_reloads_profile() {
    let backend = MemoryBackend::new();
    manager(&backend)
        .sign_up(&signup_form("hr@acme.test"))
        .await
        .unwrap();
    let session = backend
        .sign_in_with_password("hr@acme.test", "secret1")
        .await
        .unwrap();

    let manager = manager(&backend);
    let state = manager.initialize(Some(&session.access_token)).await;
    assert_eq!(
        state.employer().map(|e| e.contact_email.as_str()),
        Some("contact@acme.test")
    );

    let stale = manager.initialize(Some("not-a-token")).await;
    assert_eq!(stale, SessionState::LoggedOut);
}

#[tokio::test]
async fn principal_without_employer_row_is_a_load_failure() {
    let backend = MemoryBackend::new();
    backend.sign_up("orphan@acme.test", "secret1").await.unwrap();

    let manager = manager(&backend);
    manager.sign_in("orphan@acme.test", "secret1").await.unwrap();

    match manager.state() {
        SessionState::ProfileLoadFailed { reason, session } => {
            assert_eq!(reason, ProfileLoadError::Missing);
            assert_eq!(session.user.email.as_deref(), Some("orphan@acme.test"));
        }
        other => panic!("unexpected state: {:?}", other),
    }
    assert!(!manager.state().is_pending());
}

#[tokio::test]
async fn contact_update_applies_only_after_store_confirms() {
    let backend = MemoryBackend::new();
    let manager = manager(&backend);
    manager.sign_up(&signup_form("hr@acme.test")).await.unwrap();

    let changes = EmployerContactUpdate {
        contact_phone: Some("+49 30 555".to_string()),
        ..Default::default()
    };

    backend.fail(Table::Employers, Operation::Update);
    let err = manager.update_contact(&changes).await.unwrap_err();
    assert!(matches!(err, SessionError::Store(_)));
    assert_eq!(manager.employer().unwrap().contact_phone, None);

    backend.recover(Table::Employers, Operation::Update);
    let updated = manager.update_contact(&changes).await.unwrap();
    assert_eq!(updated.contact_phone.as_deref(), Some("+49 30 555"));
    assert_eq!(
        manager.employer().unwrap().contact_phone.as_deref(),
        Some("+49 30 555")
    );
}

#[tokio::test]
async fn contact_update_requires_a_ready_profile() {
    let backend = MemoryBackend::new();
    seed_employer(&backend, "e1", "u1");
    let manager = manager(&backend);

    let err = manager
        .update_contact(&EmployerContactUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::NotSignedIn);
}
