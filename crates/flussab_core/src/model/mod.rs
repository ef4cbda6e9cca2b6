//! Domain model for topics and their detail lines.
//!
//! # Responsibility
//! - Define canonical data structures used by stores and repositories.
//!
//! # Invariants
//! - Every topic is identified by a stable `TopicId`.
//! - Topics and details are never deleted.

pub mod topic;
