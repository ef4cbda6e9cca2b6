//! Core domain logic for Flussabwärts topic notes.
//! This crate is the single source of truth for topic/detail invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, LoggingConfig, StorageConfig};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status, LoggingError};
pub use model::topic::{Topic, TopicId, TopicIdAllocator, TopicValidationError};
pub use repo::topic_repo::{RepoError, RepoResult, SqliteTopicRepository, TopicRepository};
pub use service::durable_store::DurableTopicStore;
pub use service::topic_store::{StoreError, StoreResult, TopicStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
