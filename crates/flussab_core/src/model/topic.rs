//! Topic domain model.
//!
//! # Responsibility
//! - Define the canonical topic record shared by in-memory and durable stores.
//! - Own input normalization rules for topic names and detail lines.
//! - Allocate creation-time ids that are never reused.
//!
//! # Invariants
//! - `id` is unique for the lifetime of a store and never reassigned.
//! - `name` is trimmed and non-empty.
//! - `details` is append-only; entries keep insertion order.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable identifier for a topic.
///
/// Derived from the creation timestamp in epoch milliseconds, so descending
/// id order doubles as most-recent-first order.
pub type TopicId = i64;

/// A named grouping with an ordered list of detail lines.
///
/// Serialized shape: `{ id, name, details, expanded }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    /// Trimmed, immutable after creation.
    pub name: String,
    /// Append-only detail lines, stored verbatim.
    pub details: Vec<String>,
    /// View state: whether this topic is the expanded one.
    #[serde(default)]
    pub expanded: bool,
}

impl Topic {
    /// Creates a topic with empty details from raw user input.
    ///
    /// Returns `None` when `name` is blank after trim.
    pub fn new(id: TopicId, name: &str) -> Option<Self> {
        let name = normalize_topic_name(name)?;
        Some(Self {
            id,
            name,
            details: Vec::new(),
            expanded: false,
        })
    }

    /// Appends one detail line verbatim.
    pub fn push_detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    /// Checks invariants that persisted records must satisfy.
    pub fn validate(&self) -> Result<(), TopicValidationError> {
        if self.name.trim().is_empty() {
            return Err(TopicValidationError::BlankName(self.id));
        }
        if self.name.trim() != self.name {
            return Err(TopicValidationError::UntrimmedName(self.id));
        }
        Ok(())
    }
}

/// Validation failures for topic records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicValidationError {
    BlankName(TopicId),
    UntrimmedName(TopicId),
}

impl std::fmt::Display for TopicValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName(id) => write!(f, "topic {id} has a blank name"),
            Self::UntrimmedName(id) => {
                write!(f, "topic {id} name has leading or trailing whitespace")
            }
        }
    }
}

impl std::error::Error for TopicValidationError {}

/// Normalizes a topic name; `None` means the input must be ignored.
pub fn normalize_topic_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Returns whether a detail line is accepted. Accepted text is kept verbatim.
pub fn is_valid_detail(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Allocates strictly increasing topic ids from the wall clock.
///
/// Two topics created within the same millisecond still get distinct ids:
/// the allocator bumps to `last + 1` whenever the clock has not moved past
/// the last issued id.
#[derive(Debug, Clone, Default)]
pub struct TopicIdAllocator {
    last: Option<TopicId>,
}

impl TopicIdAllocator {
    /// Creates an allocator that never issues ids `<= floor`.
    pub fn starting_after(floor: Option<TopicId>) -> Self {
        Self { last: floor }
    }

    /// Issues the next id using the current wall clock.
    ///
    /// Returns `None` once the id space is exhausted (last id is `i64::MAX`).
    pub fn next_id(&mut self) -> Option<TopicId> {
        self.next_id_at(now_epoch_ms())
    }

    /// Issues the next id for a given clock reading.
    pub fn next_id_at(&mut self, now_ms: i64) -> Option<TopicId> {
        let id = match self.last {
            Some(last) if now_ms <= last => last.checked_add(1)?,
            _ => now_ms,
        };
        self.last = Some(id);
        Some(id)
    }

    /// Last id issued or observed, if any.
    pub fn last(&self) -> Option<TopicId> {
        self.last
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
