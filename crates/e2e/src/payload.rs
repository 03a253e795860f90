//! Raw map payloads for malformed-input scenarios.
//!
//! Start from a valid baseline and knock fields out by their business name,
//! e.g. `remove("page count")`. The label tables are closed on purpose: a
//! label nobody mapped is a mistake in the scenario, so it fails at once
//! instead of silently sending a complete payload.

use bookstore_common::{unique_id, Author, Book, Entity, EntityId};
use serde_json::{json, Value};
use std::marker::PhantomData;

use crate::error::AuthoringError;

/// Field name -> value, in insertion order
pub type RawPayload = serde_json::Map<String, Value>;

/// Baseline contents and label vocabulary for one entity kind.
pub trait PayloadSchema: Entity {
    /// Label -> wire field, as scenario authors write it
    const FIELD_LABELS: &'static [(&'static str, &'static str)];

    /// A payload the API should accept, keyed by `id`.
    fn baseline(id: EntityId) -> RawPayload;

    /// Wire field for a business label, if the label is mapped.
    fn field_for_label(label: &str) -> Option<&'static str> {
        let wanted = label.trim();
        Self::FIELD_LABELS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(wanted))
            .map(|(_, field)| *field)
    }
}

impl PayloadSchema for Book {
    const FIELD_LABELS: &'static [(&'static str, &'static str)] = &[
        ("page count", "pageCount"),
        ("publish date", "publishDate"),
        ("title", "title"),
        ("description", "description"),
    ];

    fn baseline(id: EntityId) -> RawPayload {
        object(json!({
            "id": id,
            "title": "Test Title",
            "description": "Test Description",
            "pageCount": 100,
            "excerpt": "Test Excerpt",
            "publishDate": "2020-01-01T00:00:00.000Z",
        }))
    }
}

impl PayloadSchema for Author {
    const FIELD_LABELS: &'static [(&'static str, &'static str)] = &[
        ("display name", "firstName"),
        ("short bio", "lastName"),
        ("date of birth", "idBook"),
    ];

    fn baseline(id: EntityId) -> RawPayload {
        object(json!({
            "id": id,
            "idBook": id,
            "firstName": "Test Name",
            "lastName": "Test Surname",
        }))
    }
}

fn object(value: Value) -> RawPayload {
    match value {
        Value::Object(map) => map,
        _ => RawPayload::new(),
    }
}

/// Builder over a raw payload for entity kind `E`
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadMapBuilder<E> {
    payload: RawPayload,
    _entity: PhantomData<fn() -> E>,
}

impl<E: PayloadSchema> PayloadMapBuilder<E> {
    /// Valid baseline with a freshly generated id.
    pub fn valid() -> Self {
        Self::valid_with_id(unique_id())
    }

    pub fn valid_with_id(id: EntityId) -> Self {
        Self {
            payload: E::baseline(id),
            _entity: PhantomData,
        }
    }

    /// Set or override a wire field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Remove the field a business label maps to.
    pub fn remove(mut self, label: &str) -> Result<Self, AuthoringError> {
        let field = E::field_for_label(label).ok_or_else(|| AuthoringError::UnmappedField {
            kind: E::KIND,
            label: label.trim().to_string(),
        })?;
        self.payload.remove(field);
        Ok(self)
    }

    /// Current id field, if it is still present and numeric.
    pub fn id(&self) -> Option<EntityId> {
        self.payload
            .get("id")
            .and_then(Value::as_i64)
            .and_then(|id| EntityId::try_from(id).ok())
    }

    /// Copy of the accumulated payload. The builder stays usable.
    pub fn build(&self) -> RawPayload {
        self.payload.clone()
    }
}
