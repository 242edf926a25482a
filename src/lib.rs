//! Pazzle: employer-facing recruiting marketplace.
//!
//! View-models for the landing page, the worker listing and the worker
//! profile, a session manager owning the signed-in employer, and a JSON API
//! serving them. Data lives in a hosted Postgres/auth service reached over
//! its REST interface.

#[macro_use]
pub mod logging;

pub mod auth;
pub mod cli;
pub mod core;
pub mod dashboard;
pub mod landing;
pub mod profile;
pub mod session;
pub mod types;
pub mod utils;
pub mod web;

pub use crate::core::{ConfigManager, MemoryBackend, Repository, SupabaseClient};
pub use dashboard::{Dashboard, Shortlist, ToggleOutcome, WorkerFilter};
pub use landing::{Landing, TeaserCard};
pub use profile::{ContactComposer, ContactOutcome, ProfileView};
pub use session::{SessionManager, SessionState, SignUpForm};
pub use web::{build_rocket, start_web_server, ServerState};
