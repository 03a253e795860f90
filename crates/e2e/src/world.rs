//! Per-scenario state shared between steps
//!
//! A world is created fresh for every scenario and thrown away after
//! cleanup. It performs no I/O. Only the most recent entity of each kind is
//! current, but every id that may exist remotely stays tracked until a step
//! deletes it or cleanup takes it.

use bookstore_common::{Author, Book, Entity, EntityId, EntityKind};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::HttpOutcome;

/// "Current" entity of one kind
#[derive(Debug, Clone, PartialEq)]
pub struct EntityContext<E> {
    last_id: Option<EntityId>,
    last_payload: Option<E>,
    last_response: Option<HttpOutcome>,
    tracked: Vec<EntityId>,
}

impl<E> Default for EntityContext<E> {
    fn default() -> Self {
        Self {
            last_id: None,
            last_payload: None,
            last_response: None,
            tracked: Vec::new(),
        }
    }
}

impl<E: Entity> EntityContext<E> {
    pub fn last_id(&self) -> Option<EntityId> {
        self.last_id
    }

    pub fn last_payload(&self) -> Option<&E> {
        self.last_payload.as_ref()
    }

    pub fn last_response(&self) -> Option<&HttpOutcome> {
        self.last_response.as_ref()
    }

    /// Most recently tracked id that still owes a cleanup delete
    pub fn tracked(&self) -> Option<EntityId> {
        self.tracked.last().copied()
    }

    /// Every id that still owes a cleanup delete, oldest first
    pub fn tracked_all(&self) -> &[EntityId] {
        &self.tracked
    }

    /// Remember a payload without claiming it exists remotely.
    pub fn set_payload(&mut self, entity: E) {
        self.last_payload = Some(entity);
    }

    pub fn set_last_id(&mut self, id: EntityId) {
        self.last_id = Some(id);
    }

    /// Remember an entity that was (or may have been) created remotely, so
    /// cleanup will delete it. Replaces whatever was current before;
    /// earlier tracked ids stay tracked.
    pub fn track_created(&mut self, entity: E) {
        let id = entity.id();
        self.last_id = Some(id);
        self.track_for_cleanup(id);
        self.last_payload = Some(entity);
    }

    /// Track an id for cleanup without changing the current payload.
    pub fn track_id(&mut self, id: EntityId) {
        self.last_id = Some(id);
        self.track_for_cleanup(id);
    }

    /// Owe a cleanup delete for `id` without making it current.
    pub fn track_for_cleanup(&mut self, id: EntityId) {
        if !self.tracked.contains(&id) {
            self.tracked.push(id);
        }
    }

    /// A step deleted `id` itself. Cleanup no longer owes a delete for it,
    /// but the id stays current so later steps can still reference it.
    pub fn forget_deleted(&mut self, id: EntityId) {
        self.tracked.retain(|tracked| *tracked != id);
    }

    fn record_response(&mut self, outcome: HttpOutcome) {
        self.last_response = Some(outcome);
    }

    /// Hand the newest tracked id to cleanup. The current id is cleared
    /// with it.
    pub fn take_tracked(&mut self) -> Option<EntityId> {
        let id = self.tracked.pop()?;
        if self.last_id == Some(id) {
            self.last_id = None;
        }
        Some(id)
    }
}

/// Mutable state for one scenario
#[derive(Debug, Default)]
pub struct ScenarioWorld {
    books: EntityContext<Book>,
    authors: EntityContext<Author>,
    last_kind: Option<EntityKind>,
    context: HashMap<String, Value>,
}

impl ScenarioWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn books(&self) -> &EntityContext<Book> {
        &self.books
    }

    pub fn books_mut(&mut self) -> &mut EntityContext<Book> {
        &mut self.books
    }

    pub fn authors(&self) -> &EntityContext<Author> {
        &self.authors
    }

    pub fn authors_mut(&mut self) -> &mut EntityContext<Author> {
        &mut self.authors
    }

    /// Store the outcome of a call made on behalf of `kind`.
    pub fn record_response(&mut self, kind: EntityKind, outcome: HttpOutcome) {
        match kind {
            EntityKind::Book => self.books.record_response(outcome),
            EntityKind::Author => self.authors.record_response(outcome),
        }
        self.last_kind = Some(kind);
    }

    /// Most recent outcome recorded for either kind
    pub fn last_response(&self) -> Option<&HttpOutcome> {
        match self.last_kind? {
            EntityKind::Book => self.books.last_response(),
            EntityKind::Author => self.authors.last_response(),
        }
    }

    /// Ids that still owe a cleanup delete, books first
    pub fn tracked_ids(&self) -> Vec<(EntityKind, EntityId)> {
        let books = self.books.tracked.iter().map(|id| (EntityKind::Book, *id));
        let authors = self.authors.tracked.iter().map(|id| (EntityKind::Author, *id));
        books.chain(authors).collect()
    }

    pub fn context(&self) -> &HashMap<String, Value> {
        &self.context
    }

    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.context.insert(key.into(), value.into());
    }

    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    pub fn set_flag(&mut self, key: impl Into<String>) {
        self.set_context(key, true);
    }

    /// `true` only if the key was set to boolean `true`
    pub fn flag(&self, key: &str) -> bool {
        self.context.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}
