//! Core use-case services.
//!
//! # Responsibility
//! - Apply topic/detail mutations to the in-memory store.
//! - Mirror mutations into durable storage for the durable variant.
//! - Keep the CLI layer decoupled from storage details.

pub mod durable_store;
pub mod topic_store;
