// src/core/mod.rs
//! Store access, query building and configuration shared by every view

pub mod config_manager;
pub mod memory_store;
pub mod query;
pub mod rest_client;
pub mod store;

pub use config_manager::ConfigManager;
pub use memory_store::{MemoryBackend, Operation};
pub use query::{Filter, Order, Query, Table};
pub use rest_client::SupabaseClient;
pub use store::{AuthBackend, AuthError, RemoteStore, Repository, StoreError};
