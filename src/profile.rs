// src/profile.rs
//! Worker detail view and the contact request composer

use serde::Serialize;
use std::time::Duration;

use crate::app_log;
use crate::core::store::Repository;
use crate::types::{
    Employer, NewContactRequest, WorkExperience, Worker, WorkerLanguage, WorkerReference,
    WorkerSkill,
};
use crate::utils::age_today;

pub const CONTACT_CONFIRMATION_DELAY: Duration = Duration::from_secs(2);

// ===== Detail =====

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerDetail {
    pub worker: Worker,
    pub age: Option<u32>,
    pub experience: Vec<WorkExperience>,
    pub languages: Vec<WorkerLanguage>,
    pub skills: Vec<WorkerSkill>,
    pub references: Vec<WorkerReference>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileView {
    Loading,
    NotFound,
    Ready(Box<WorkerDetail>),
}

impl ProfileView {
    /// Fetch the worker and its four child collections in parallel.
    pub async fn load(repo: &Repository, worker_id: &str) -> Self {
        let (worker, experience, languages, skills, references) = tokio::join!(
            repo.find_worker(worker_id),
            repo.work_experience(worker_id),
            repo.languages(worker_id),
            repo.skills(worker_id),
            repo.references(worker_id),
        );

        let worker = match worker {
            Ok(Some(worker)) => worker,
            Ok(None) => {
                app_log!(info, "Worker {} not found", worker_id);
                return ProfileView::NotFound;
            }
            Err(e) => {
                app_log!(error, "Error loading worker data for {}: {}", worker_id, e);
                return ProfileView::NotFound;
            }
        };

        ProfileView::Ready(Box::new(WorkerDetail {
            age: age_today(worker.date_of_birth),
            worker,
            experience: or_empty(experience, "work experience", worker_id),
            languages: or_empty(languages, "languages", worker_id),
            skills: or_empty(skills, "skills", worker_id),
            references: or_empty(references, "references", worker_id),
        }))
    }

    pub fn detail(&self) -> Option<&WorkerDetail> {
        match self {
            ProfileView::Ready(detail) => Some(detail),
            _ => None,
        }
    }
}

fn or_empty<T, E: std::fmt::Display>(
    result: Result<Vec<T>, E>,
    what: &str,
    worker_id: &str,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        app_log!(error, "Error loading {} for {}: {}", what, worker_id, e);
        Vec::new()
    })
}

// ===== Contact Requests =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPhase {
    Editing,
    Sending,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactOutcome {
    Sent,
    /// Blank message or no employer; nothing was sent.
    Skipped,
    /// The store refused the insert; the form keeps its text.
    Failed,
}

/// Contact form for one worker. Creates `pending` requests only.
#[derive(Debug, Clone)]
pub struct ContactComposer {
    pub worker_id: String,
    pub message: String,
    phase: ContactPhase,
    confirmation_delay: Duration,
}

impl ContactComposer {
    pub fn new(worker_id: &str) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            message: String::new(),
            phase: ContactPhase::Editing,
            confirmation_delay: CONTACT_CONFIRMATION_DELAY,
        }
    }

    pub fn with_confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay = delay;
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    pub fn phase(&self) -> ContactPhase {
        self.phase
    }

    pub async fn submit(
        &mut self,
        repo: &Repository,
        employer: Option<&Employer>,
    ) -> ContactOutcome {
        let employer = match employer {
            Some(employer) if !self.message.trim().is_empty() => employer,
            _ => return ContactOutcome::Skipped,
        };

        self.phase = ContactPhase::Sending;
        let request = NewContactRequest::new(&employer.id, &self.worker_id, &self.message);

        match repo.insert_contact_request(&request).await {
            Ok(()) => {
                app_log!(
                    info,
                    "Contact request from {} to worker {} created",
                    employer.id,
                    self.worker_id
                );
                self.phase = ContactPhase::Confirmed;
                ContactOutcome::Sent
            }
            Err(e) => {
                app_log!(error, "Error sending contact request: {}", e);
                self.phase = ContactPhase::Editing;
                ContactOutcome::Failed
            }
        }
    }

    /// After a confirmed send, wait out the confirmation and clear the form.
    pub async fn settle(&mut self) {
        if self.phase != ContactPhase::Confirmed {
            return;
        }
        tokio::time::sleep(self.confirmation_delay).await;
        self.message.clear();
        self.phase = ContactPhase::Editing;
    }
}
