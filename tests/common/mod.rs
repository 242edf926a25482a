#![allow(dead_code)]

use chrono::{Duration, Utc};
use pazzle::core::{MemoryBackend, Repository, Table};
use pazzle::session::{SessionManager, SignUpForm};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn manager(backend: &MemoryBackend) -> SessionManager {
    let backend = Arc::new(backend.clone());
    SessionManager::new(backend.clone(), backend)
}

pub fn repository(backend: &MemoryBackend) -> Repository {
    Repository::new(Arc::new(backend.clone()))
}

pub fn signup_form(email: &str) -> SignUpForm {
    SignUpForm {
        email: email.to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
        company_name: "Acme Staffing".to_string(),
        contact_email: "contact@acme.test".to_string(),
        contact_phone: None,
        role: None,
    }
}

/// Worker row; `age_days` controls `created_at` so listing order is predictable.
pub fn worker_row(id: &str, name: &str, location: &str, status: &str, age_days: i64) -> Value {
    let created = (Utc::now() - Duration::days(age_days)).to_rfc3339();
    json!({
        "id": id,
        "full_name": name,
        "gender": "female",
        "date_of_birth": "1990-06-15",
        "email": format!("{}@workers.test", id),
        "phone": "+49 30 1234",
        "location": location,
        "availability": "Immediately",
        "current_status": status,
        "is_featured": false,
        "created_at": created,
        "updated_at": created,
    })
}

pub fn seed_worker(backend: &MemoryBackend, id: &str, name: &str, location: &str, status: &str) {
    backend.seed(Table::Workers, worker_row(id, name, location, status, 1));
}

pub fn seed_featured(backend: &MemoryBackend, id: &str, name: &str, languages: &[&str]) {
    let mut row = worker_row(id, name, "Belgrade", "Caregiver", 1);
    row["is_featured"] = json!(true);
    backend.seed(Table::Workers, row);
    for language in languages {
        backend.seed(
            Table::WorkerLanguages,
            json!({
                "id": format!("{}-{}", id, language),
                "worker_id": id,
                "language": language,
                "proficiency": "fluent",
            }),
        );
    }
}

pub fn seed_employer(backend: &MemoryBackend, id: &str, user_id: &str) {
    let now = Utc::now().to_rfc3339();
    backend.seed(
        Table::Employers,
        json!({
            "id": id,
            "user_id": user_id,
            "company_name": "Acme Staffing",
            "company_verified": false,
            "contact_email": "contact@acme.test",
            "contact_phone": null,
            "role": "recruiter",
            "created_at": now,
            "updated_at": now,
        }),
    );
}

pub fn seed_faq(backend: &MemoryBackend, id: &str, category: &str, order: i32, active: bool) {
    backend.seed(
        Table::Faqs,
        json!({
            "id": id,
            "question": format!("Question {}", id),
            "answer": format!("Answer {}", id),
            "category": category,
            "display_order": order,
            "is_active": active,
        }),
    );
}
