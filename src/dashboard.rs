// src/dashboard.rs
//! Worker listing for signed-in employers: search filter, shortlist toggle

use serde::Serialize;
use std::collections::HashSet;

use crate::app_log;
use crate::core::store::Repository;
use crate::types::{Employer, Worker};
use crate::utils::{age_today, contains_ci};

// ===== Filter =====

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerFilter {
    pub query: String,
    pub shortlist_only: bool,
}

impl WorkerFilter {
    pub fn new(query: &str, shortlist_only: bool) -> Self {
        Self {
            query: query.to_string(),
            shortlist_only,
        }
    }

    /// Empty query or a case-insensitive hit on name, location or status,
    /// and, when restricted, membership in the shortlist.
    pub fn matches(&self, worker: &Worker, shortlist: &Shortlist) -> bool {
        let query = self.query.to_lowercase();
        let text_match = query.is_empty()
            || worker.full_name.to_lowercase().contains(&query)
            || contains_ci(worker.location.as_deref(), &query)
            || contains_ci(worker.current_status.as_deref(), &query);

        text_match && (!self.shortlist_only || shortlist.contains(&worker.id))
    }
}

pub fn filter_workers<'a>(
    workers: &'a [Worker],
    filter: &WorkerFilter,
    shortlist: &Shortlist,
) -> Vec<&'a Worker> {
    workers
        .iter()
        .filter(|worker| filter.matches(worker, shortlist))
        .collect()
}

// ===== Shortlist =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Remote write failed or no employer is known; local set untouched.
    Unchanged,
}

/// Worker ids whose shortlist entry the store has confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shortlist {
    ids: HashSet<String>,
}

impl Shortlist {
    pub fn from_ids(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, worker_id: &str) -> bool {
        self.ids.contains(worker_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sorted copy of the ids
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Delete or insert remotely, then mirror the confirmed change locally.
    pub async fn toggle(
        &mut self,
        repo: &Repository,
        employer_id: &str,
        worker_id: &str,
    ) -> ToggleOutcome {
        if self.contains(worker_id) {
            match repo.delete_shortlist(employer_id, worker_id).await {
                Ok(()) => {
                    self.ids.remove(worker_id);
                    ToggleOutcome::Removed
                }
                Err(e) => {
                    app_log!(error, "Error toggling shortlist for {}: {}", worker_id, e);
                    ToggleOutcome::Unchanged
                }
            }
        } else {
            match repo.insert_shortlist(employer_id, worker_id).await {
                Ok(()) => {
                    self.ids.insert(worker_id.to_string());
                    ToggleOutcome::Added
                }
                Err(e) => {
                    app_log!(error, "Error toggling shortlist for {}: {}", worker_id, e);
                    ToggleOutcome::Unchanged
                }
            }
        }
    }
}

// ===== Dashboard =====

/// Summary shown for each worker in the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerCard {
    pub id: String,
    pub full_name: String,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub location: Option<String>,
    pub availability: Option<String>,
    pub current_status: Option<String>,
    pub profile_picture_url: Option<String>,
    pub is_shortlisted: bool,
}

impl WorkerCard {
    pub fn new(worker: &Worker, is_shortlisted: bool) -> Self {
        Self {
            id: worker.id.clone(),
            full_name: worker.full_name.clone(),
            gender: worker.gender.clone(),
            age: age_today(worker.date_of_birth),
            location: worker.location.clone(),
            availability: worker.availability.clone(),
            current_status: worker.current_status.clone(),
            profile_picture_url: worker.profile_picture_url.clone(),
            is_shortlisted,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub workers: Vec<Worker>,
    pub shortlist: Shortlist,
    pub filter: WorkerFilter,
}

impl Dashboard {
    /// Fetch workers and the employer's shortlist concurrently.
    /// Either fetch failing leaves its half empty.
    pub async fn load(repo: &Repository, employer: Option<&Employer>) -> Self {
        let shortlist_fetch = async {
            match employer {
                Some(employer) => repo.shortlisted_ids(&employer.id).await.map(Some),
                None => Ok(None),
            }
        };
        let (workers, shortlisted) = tokio::join!(repo.list_workers(), shortlist_fetch);

        let workers = workers.unwrap_or_else(|e| {
            app_log!(error, "Error loading workers: {}", e);
            Vec::new()
        });
        let shortlist = match shortlisted {
            Ok(Some(ids)) => Shortlist::from_ids(ids),
            Ok(None) => Shortlist::default(),
            Err(e) => {
                app_log!(error, "Error loading shortlist: {}", e);
                Shortlist::default()
            }
        };

        app_log!(
            debug,
            "Dashboard loaded {} workers, {} shortlisted",
            workers.len(),
            shortlist.len()
        );

        Self {
            workers,
            shortlist,
            filter: WorkerFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: WorkerFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn visible(&self) -> Vec<&Worker> {
        filter_workers(&self.workers, &self.filter, &self.shortlist)
    }

    pub fn cards(&self) -> Vec<WorkerCard> {
        self.visible()
            .into_iter()
            .map(|worker| WorkerCard::new(worker, self.shortlist.contains(&worker.id)))
            .collect()
    }

    pub async fn toggle_shortlist(
        &mut self,
        repo: &Repository,
        employer: Option<&Employer>,
        worker_id: &str,
    ) -> ToggleOutcome {
        match employer {
            Some(employer) => self.shortlist.toggle(repo, &employer.id, worker_id).await,
            None => ToggleOutcome::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn worker(id: &str, name: &str, location: Option<&str>, status: Option<&str>) -> Worker {
        Worker {
            id: id.to_string(),
            profile_picture_url: None,
            full_name: name.to_string(),
            gender: None,
            date_of_birth: None,
            email: None,
            phone: None,
            location: location.map(str::to_string),
            availability: None,
            current_status: status.map(str::to_string),
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn names(workers: Vec<&Worker>) -> Vec<&str> {
        workers.iter().map(|w| w.full_name.as_str()).collect()
    }

    #[test]
    fn query_matches_location_case_insensitively() {
        let workers = vec![
            worker("1", "Ana", Some("Berlin"), None),
            worker("2", "Sam", Some("Munich"), None),
        ];
        let result = filter_workers(
            &workers,
            &WorkerFilter::new("berlin", false),
            &Shortlist::default(),
        );
        assert_eq!(names(result), vec!["Ana"]);
    }

    #[test]
    fn query_matches_name_and_status() {
        let workers = vec![
            worker("1", "Ana", None, Some("Welder")),
            worker("2", "Sam", None, None),
            worker("3", "Samira", None, Some("Nurse")),
        ];
        let shortlist = Shortlist::default();
        assert_eq!(
            names(filter_workers(&workers, &WorkerFilter::new("SAM", false), &shortlist)),
            vec!["Sam", "Samira"]
        );
        assert_eq!(
            names(filter_workers(&workers, &WorkerFilter::new("weld", false), &shortlist)),
            vec!["Ana"]
        );
    }

    #[test]
    fn empty_query_keeps_everything_unless_shortlist_only() {
        let workers = vec![
            worker("1", "Ana", None, None),
            worker("2", "Sam", None, None),
        ];
        let shortlist = Shortlist::from_ids(vec!["2".to_string()]);

        assert_eq!(
            filter_workers(&workers, &WorkerFilter::default(), &shortlist).len(),
            2
        );
        assert_eq!(
            names(filter_workers(&workers, &WorkerFilter::new("", true), &shortlist)),
            vec!["Sam"]
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let workers = vec![
            worker("1", "Ana", Some("Berlin"), Some("Welder")),
            worker("2", "Sam", Some("Munich"), Some("Driver")),
            worker("3", "Berta", Some("Hamburg"), None),
            worker("4", "Lin", None, Some("Berlin-based nurse")),
        ];
        let shortlist = Shortlist::from_ids(vec!["1".to_string(), "4".to_string()]);

        for filter in [
            WorkerFilter::new("ber", false),
            WorkerFilter::new("ber", true),
            WorkerFilter::new("", true),
            WorkerFilter::new("zzz", false),
        ] {
            let once: Vec<Worker> = filter_workers(&workers, &filter, &shortlist)
                .into_iter()
                .cloned()
                .collect();
            let twice: Vec<Worker> = filter_workers(&once, &filter, &shortlist)
                .into_iter()
                .cloned()
                .collect();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn cards_carry_shortlist_flag() {
        let dashboard = Dashboard {
            workers: vec![worker("1", "Ana", None, None), worker("2", "Sam", None, None)],
            shortlist: Shortlist::from_ids(vec!["2".to_string()]),
            filter: WorkerFilter::default(),
        };
        let flags: Vec<bool> = dashboard.cards().iter().map(|c| c.is_shortlisted).collect();
        assert_eq!(flags, vec![false, true]);
    }
}
