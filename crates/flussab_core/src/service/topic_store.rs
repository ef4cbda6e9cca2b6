//! In-memory topic store.
//!
//! # Responsibility
//! - Own the ordered topic collection and the id allocator.
//! - Apply add-topic, add-detail and set-active transitions.
//!
//! # Invariants
//! - Display order is most-recently-created first.
//! - At most one topic is expanded at a time.
//! - Blank input is ignored, never reported as an error.

use crate::model::topic::{is_valid_detail, Topic, TopicId, TopicIdAllocator};
use crate::repo::topic_repo::RepoError;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for store-level operations.
#[derive(Debug)]
pub enum StoreError {
    /// Target topic does not exist.
    TopicNotFound(TopicId),
    /// No id above the highest existing one is left to allocate.
    IdsExhausted,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopicNotFound(id) => write!(f, "topic not found: {id}"),
            Self::IdsExhausted => write!(f, "topic id space exhausted"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::TopicNotFound(_) | Self::IdsExhausted => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TopicNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered collection of topics held in memory.
#[derive(Debug, Clone, Default)]
pub struct TopicStore {
    topics: Vec<Topic>,
    ids: TopicIdAllocator,
}

impl TopicStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates a store from previously persisted records.
    ///
    /// Records are ordered by descending id. The highest-id expanded record
    /// stays active; any other `expanded` flag is cleared.
    pub fn from_topics(mut topics: Vec<Topic>) -> Self {
        topics.sort_by(|left, right| right.id.cmp(&left.id));
        let mut seen_active = false;
        for topic in &mut topics {
            if topic.expanded && !seen_active {
                seen_active = true;
            } else {
                topic.expanded = false;
            }
        }
        let floor = topics.first().map(|topic| topic.id);
        Self {
            topics,
            ids: TopicIdAllocator::starting_after(floor),
        }
    }

    /// Topics in display order.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id == id)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Id of the expanded topic, if any.
    pub fn active(&self) -> Option<TopicId> {
        self.topics
            .iter()
            .find(|topic| topic.expanded)
            .map(|topic| topic.id)
    }

    /// Creates a topic at the head of the display order and expands it.
    ///
    /// Returns `Ok(None)` without touching the store when `name` is blank.
    pub fn add_topic(&mut self, name: &str) -> StoreResult<Option<TopicId>> {
        let Some(topic) = self.prepare_topic(name)? else {
            return Ok(None);
        };
        let id = topic.id;
        self.insert_prepared(topic);
        Ok(Some(id))
    }

    /// Appends `text` verbatim to the topic's details.
    ///
    /// Returns `Ok(false)` when `text` is blank. Blank input is checked before
    /// the id lookup, so it is ignored even for unknown ids.
    pub fn add_detail(&mut self, topic_id: TopicId, text: &str) -> StoreResult<bool> {
        if !is_valid_detail(text) {
            debug!("event=detail_add module=store status=ignored reason=blank_text");
            return Ok(false);
        }
        let topic = self
            .get_mut(topic_id)
            .ok_or(StoreError::TopicNotFound(topic_id))?;
        topic.push_detail(text);
        debug!(
            "event=detail_add module=store status=ok topic_id={} detail_count={}",
            topic_id,
            topic.details.len()
        );
        Ok(true)
    }

    /// Toggles which single topic is expanded.
    ///
    /// Selecting the already-expanded topic collapses it. Returns the active
    /// id after the transition.
    pub fn set_active(&mut self, topic_id: TopicId) -> StoreResult<Option<TopicId>> {
        let next = self.next_active(topic_id)?;
        self.apply_active(next);
        Ok(next)
    }

    /// Computes the active id that `set_active(topic_id)` would produce.
    pub(crate) fn next_active(&self, topic_id: TopicId) -> StoreResult<Option<TopicId>> {
        let topic = self
            .get(topic_id)
            .ok_or(StoreError::TopicNotFound(topic_id))?;
        if topic.expanded {
            Ok(None)
        } else {
            Ok(Some(topic_id))
        }
    }

    pub(crate) fn apply_active(&mut self, active: Option<TopicId>) {
        for topic in &mut self.topics {
            topic.expanded = Some(topic.id) == active;
        }
    }

    /// Builds the record `add_topic` would insert, consuming one id.
    ///
    /// The returned topic is already marked expanded.
    pub(crate) fn prepare_topic(&mut self, name: &str) -> StoreResult<Option<Topic>> {
        let Some(mut topic) = Topic::new(0, name) else {
            debug!("event=topic_add module=store status=ignored reason=blank_name");
            return Ok(None);
        };
        topic.id = self.ids.next_id().ok_or(StoreError::IdsExhausted)?;
        topic.expanded = true;
        Ok(Some(topic))
    }

    pub(crate) fn insert_prepared(&mut self, topic: Topic) {
        let id = topic.id;
        let expanded = topic.expanded;
        if expanded {
            self.apply_active(None);
        }
        self.topics.insert(0, topic);
        debug!(
            "event=topic_add module=store status=ok topic_id={} topic_count={}",
            id,
            self.topics.len()
        );
    }

    fn get_mut(&mut self, id: TopicId) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|topic| topic.id == id)
    }
}
