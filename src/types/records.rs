// src/types/records.rs
//! Row types for the remote tables. Field names match the column names.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ===== Employers =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployerRole {
    Admin,
    #[default]
    Recruiter,
    Viewer,
}

impl EmployerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployerRole::Admin => "admin",
            EmployerRole::Recruiter => "recruiter",
            EmployerRole::Viewer => "viewer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employer {
    pub id: String,
    pub user_id: String,
    pub company_name: String,
    #[serde(default)]
    pub company_verified: bool,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub role: EmployerRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for `employers`; the store fills id, verification and timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct NewEmployer {
    pub user_id: String,
    pub company_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub role: EmployerRole,
}

/// Mutable contact and role fields of an employer profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployerContactUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<EmployerRole>,
}

impl EmployerContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.contact_email.is_none() && self.contact_phone.is_none() && self.role.is_none()
    }
}

// ===== Workers =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub profile_picture_url: Option<String>,
    pub full_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub availability: Option<String>,
    pub current_status: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub id: String,
    pub worker_id: String,
    pub employer: String,
    pub role: String,
    pub duties: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Native,
    Fluent,
    Intermediate,
    Basic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerLanguage {
    pub id: String,
    pub worker_id: String,
    pub language: String,
    pub proficiency: Proficiency,
}

/// Projection used by the landing page's batched language query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerLanguageName {
    pub worker_id: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSkill {
    pub id: String,
    pub worker_id: String,
    pub skill: String,
    pub certification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerReference {
    pub id: String,
    pub worker_id: String,
    pub contact_name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// ===== Shortlist =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub id: String,
    pub employer_id: String,
    pub worker_id: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewShortlistEntry {
    pub employer_id: String,
    pub worker_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Projection used when only the shortlisted ids are needed.
#[derive(Debug, Clone, Deserialize)]
pub struct ShortlistedWorkerId {
    pub worker_id: String,
}

// ===== Contact requests =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub id: String,
    pub employer_id: String,
    pub worker_id: String,
    pub message: Option<String>,
    #[serde(default)]
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

/// Contact requests are only ever created as `pending`.
#[derive(Debug, Clone, Serialize)]
pub struct NewContactRequest {
    pub employer_id: String,
    pub worker_id: String,
    pub message: String,
    status: ContactStatus,
}

impl NewContactRequest {
    pub fn new(employer_id: &str, worker_id: &str, message: &str) -> Self {
        Self {
            employer_id: employer_id.to_string(),
            worker_id: worker_id.to_string(),
            message: message.to_string(),
            status: ContactStatus::Pending,
        }
    }

    pub fn status(&self) -> ContactStatus {
        self.status
    }
}

// ===== FAQs =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn worker_row_tolerates_missing_optional_columns() {
        let row = json!({
            "id": "w1",
            "profile_picture_url": null,
            "full_name": "Ana Petrova",
            "gender": "female",
            "date_of_birth": "1994-03-12",
            "email": null,
            "phone": null,
            "location": "Berlin",
            "availability": "immediately",
            "current_status": "Welder",
            "created_at": "2024-02-01T10:00:00+00:00",
            "updated_at": "2024-02-01T10:00:00+00:00"
        });

        let worker: Worker = serde_json::from_value(row).unwrap();
        assert_eq!(worker.full_name, "Ana Petrova");
        assert!(!worker.is_featured);
        assert_eq!(
            worker.date_of_birth,
            NaiveDate::from_ymd_opt(1994, 3, 12)
        );
    }

    #[test]
    fn new_contact_request_is_pending_on_the_wire() {
        let request = NewContactRequest::new("e1", "w1", "Hello");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(request.status(), ContactStatus::Pending);
    }

    #[test]
    fn contact_update_skips_untouched_fields() {
        let update = EmployerContactUpdate {
            contact_phone: Some("+49 30 1234".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({ "contact_phone": "+49 30 1234" }));
        assert!(!update.is_empty());
        assert!(EmployerContactUpdate::default().is_empty());
    }
}
