// src/landing.rs
//! Public landing page: featured worker teasers and the FAQ list.
//! Nothing here exposes contact details or the full profile.

use serde::Serialize;
use std::collections::HashMap;

use crate::app_log;
use crate::core::store::Repository;
use crate::types::{Faq, Worker, WorkerLanguageName};
use crate::utils::{age_today, initials};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallToAction {
    /// "View profile" leads to sign-in for anonymous visitors.
    SignInToViewProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeaserCard {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub age: Option<u32>,
    pub occupation: Option<String>,
    pub languages: Vec<String>,
    pub availability: Option<String>,
    pub call_to_action: CallToAction,
}

impl TeaserCard {
    fn new(worker: &Worker, languages: Vec<String>) -> Self {
        Self {
            id: worker.id.clone(),
            name: worker.full_name.clone(),
            initials: initials(&worker.full_name),
            age: age_today(worker.date_of_birth),
            occupation: worker.current_status.clone(),
            languages,
            availability: worker.availability.clone(),
            call_to_action: CallToAction::SignInToViewProfile,
        }
    }
}

/// Language names per worker id, in the order the store returned them.
pub fn group_languages(rows: Vec<WorkerLanguageName>) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        grouped.entry(row.worker_id).or_default().push(row.language);
    }
    grouped
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Landing {
    pub featured: Vec<TeaserCard>,
}

impl Landing {
    /// Featured workers first, then their languages in one batched query.
    pub async fn load(repo: &Repository) -> Self {
        let workers = match repo.featured_workers().await {
            Ok(workers) => workers,
            Err(e) => {
                app_log!(error, "Error loading featured workers: {}", e);
                return Self::default();
            }
        };

        let ids: Vec<String> = workers.iter().map(|w| w.id.clone()).collect();
        let mut languages = match repo.languages_for(&ids).await {
            Ok(rows) => group_languages(rows),
            Err(e) => {
                app_log!(error, "Error loading featured worker languages: {}", e);
                return Self::default();
            }
        };

        let featured = workers
            .iter()
            .map(|worker| TeaserCard::new(worker, languages.remove(&worker.id).unwrap_or_default()))
            .collect();

        Self { featured }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqCategory {
    pub category: String,
    pub faqs: Vec<Faq>,
}

/// Active FAQs ordered by display order; empty on failure.
pub async fn load_faqs(repo: &Repository) -> Vec<Faq> {
    repo.active_faqs().await.unwrap_or_else(|e| {
        app_log!(error, "Error loading FAQs: {}", e);
        Vec::new()
    })
}

/// Group FAQs by category, categories in order of first appearance.
pub fn faqs_by_category(faqs: &[Faq]) -> Vec<FaqCategory> {
    let mut categories: Vec<FaqCategory> = Vec::new();
    for faq in faqs {
        match categories.iter_mut().find(|c| c.category == faq.category) {
            Some(category) => category.faqs.push(faq.clone()),
            None => categories.push(FaqCategory {
                category: faq.category.clone(),
                faqs: vec![faq.clone()],
            }),
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(worker_id: &str, language: &str) -> WorkerLanguageName {
        WorkerLanguageName {
            worker_id: worker_id.to_string(),
            language: language.to_string(),
        }
    }

    fn faq(id: &str, category: &str, order: i32) -> Faq {
        Faq {
            id: id.to_string(),
            question: format!("Q{}", id),
            answer: format!("A{}", id),
            category: category.to_string(),
            display_order: order,
            is_active: true,
        }
    }

    #[test]
    fn languages_grouped_per_worker_in_returned_order() {
        let grouped = group_languages(vec![
            lang("w1", "German"),
            lang("w2", "English"),
            lang("w1", "Serbian"),
        ]);
        assert_eq!(grouped["w1"], vec!["German", "Serbian"]);
        assert_eq!(grouped["w2"], vec!["English"]);
    }

    #[test]
    fn faq_categories_keep_first_appearance_order() {
        let faqs = vec![faq("1", "Hiring", 1), faq("2", "Visa", 2), faq("3", "Hiring", 3)];
        let grouped = faqs_by_category(&faqs);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].category, "Hiring");
        assert_eq!(grouped[0].faqs.len(), 2);
        assert_eq!(grouped[1].category, "Visa");
    }
}
