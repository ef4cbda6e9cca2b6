//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable record store contract for topics.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Topic::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod topic_repo;
