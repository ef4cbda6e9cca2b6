//! Durable topic store.
//!
//! # Responsibility
//! - Mirror `TopicStore` mutations into a `TopicRepository`.
//! - Rehydrate the in-memory store from durable records on open/reload.
//!
//! # Invariants
//! - Storage is written before memory; a failed write leaves memory as-is.
//! - Each mutation is a single repository call, so storage never holds a
//!   half-applied transition.
//! - Blank input is ignored before any storage access.
//! - Storage failures are returned to the caller without retry.

use crate::model::topic::{is_valid_detail, Topic, TopicId};
use crate::repo::topic_repo::TopicRepository;
use crate::service::topic_store::{StoreError, StoreResult, TopicStore};
use log::{debug, error, info};
use std::time::Instant;

/// `TopicStore` facade backed by durable storage.
pub struct DurableTopicStore<R: TopicRepository> {
    repo: R,
    store: TopicStore,
}

impl<R: TopicRepository> DurableTopicStore<R> {
    /// Loads every persisted topic and builds the in-memory view.
    pub fn open(repo: R) -> StoreResult<Self> {
        let started_at = Instant::now();
        let topics = repo.load_all().map_err(|err| {
            error!(
                "event=store_open module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            err
        })?;
        let store = TopicStore::from_topics(topics);
        info!(
            "event=store_open module=store status=ok duration_ms={} topic_count={}",
            started_at.elapsed().as_millis(),
            store.len()
        );
        Ok(Self { repo, store })
    }

    /// Discards in-memory state and reloads from storage.
    pub fn reload(&mut self) -> StoreResult<()> {
        let topics = self.repo.load_all()?;
        self.store = TopicStore::from_topics(topics);
        Ok(())
    }

    /// Current in-memory view.
    pub fn store(&self) -> &TopicStore {
        &self.store
    }

    pub fn topics(&self) -> &[Topic] {
        self.store.topics()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates and persists a new expanded topic at the head.
    ///
    /// The insert and the collapse of the previously expanded record are one
    /// storage write. Returns `Ok(None)` when `name` is blank.
    pub fn add_topic(&mut self, name: &str) -> StoreResult<Option<TopicId>> {
        let Some(topic) = self.store.prepare_topic(name)? else {
            return Ok(None);
        };

        let id = self.repo.insert(&topic).map_err(|err| {
            error!(
                "event=topic_add module=store status=error topic_id={} error={}",
                topic.id, err
            );
            StoreError::from(err)
        })?;
        self.store.insert_prepared(topic);
        Ok(Some(id))
    }

    /// Appends a detail in storage, then in memory.
    ///
    /// Returns `Ok(false)` when `text` is blank.
    pub fn add_detail(&mut self, topic_id: TopicId, text: &str) -> StoreResult<bool> {
        if !is_valid_detail(text) {
            debug!("event=detail_add module=store status=ignored reason=blank_text");
            return Ok(false);
        }
        if self.store.get(topic_id).is_none() {
            return Err(StoreError::TopicNotFound(topic_id));
        }

        self.repo.append_detail(topic_id, text).map_err(|err| {
            error!(
                "event=detail_add module=store status=error topic_id={} error={}",
                topic_id, err
            );
            StoreError::from(err)
        })?;
        self.store.add_detail(topic_id, text)
    }

    /// Toggles the expanded topic, persisting every flag in one write.
    pub fn set_active(&mut self, topic_id: TopicId) -> StoreResult<Option<TopicId>> {
        let next = self.store.next_active(topic_id)?;

        self.repo.set_expanded(next).map_err(|err| {
            error!(
                "event=topic_expand module=store status=error topic_id={} error={}",
                topic_id, err
            );
            StoreError::from(err)
        })?;
        self.store.apply_active(next);
        Ok(next)
    }
}
