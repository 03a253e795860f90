//! Response assertion DSL
//!
//! ```ignore
//! assert_that(&outcome).has_status(HttpCode::Ok)?;
//! assert_that(&outcome).has_status_in(&[HttpCode::NotFound, HttpCode::NoContent])?;
//! ```
//!
//! The set form lets a negative scenario say "this is rejected" without
//! pinning the exact code the API picks.

use bookstore_common::{Entity, EntityId, HttpCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::HttpOutcome;
use crate::error::{AuthoringError, E2eError, E2eResult};

/// Non-empty, ordered list of acceptable status codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<HttpCode>", into = "Vec<HttpCode>")]
pub struct ExpectedStatusSet(Vec<HttpCode>);

impl ExpectedStatusSet {
    /// A set that is non-empty by construction.
    pub fn of(first: HttpCode, rest: &[HttpCode]) -> Self {
        let mut codes = Vec::with_capacity(rest.len() + 1);
        codes.push(first);
        codes.extend_from_slice(rest);
        Self(codes)
    }

    pub fn codes(&self) -> &[HttpCode] {
        &self.0
    }

    pub fn contains(&self, status: u16) -> bool {
        self.0.iter().any(|code| code.code() == status)
    }

    /// `NAME (code), NAME (code)`
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .map(HttpCode::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TryFrom<Vec<HttpCode>> for ExpectedStatusSet {
    type Error = AuthoringError;

    fn try_from(codes: Vec<HttpCode>) -> Result<Self, Self::Error> {
        if codes.is_empty() {
            return Err(AuthoringError::EmptyExpectedStatus);
        }
        Ok(Self(codes))
    }
}

impl TryFrom<&[HttpCode]> for ExpectedStatusSet {
    type Error = AuthoringError;

    fn try_from(codes: &[HttpCode]) -> Result<Self, Self::Error> {
        Self::try_from(codes.to_vec())
    }
}

impl From<ExpectedStatusSet> for Vec<HttpCode> {
    fn from(set: ExpectedStatusSet) -> Self {
        set.0
    }
}

impl From<HttpCode> for ExpectedStatusSet {
    fn from(code: HttpCode) -> Self {
        Self::of(code, &[])
    }
}

/// Entry point of the DSL
pub fn assert_that(outcome: &HttpOutcome) -> ResponseAssertion<'_> {
    ResponseAssertion { outcome }
}

/// Assertions over one captured response
#[derive(Debug, Clone, Copy)]
pub struct ResponseAssertion<'a> {
    outcome: &'a HttpOutcome,
}

impl<'a> ResponseAssertion<'a> {
    fn actual(&self) -> String {
        let status = self.outcome.status();
        format!("{} ({})", HttpCode::name_of(status), status)
    }

    /// Status must equal `expected`.
    pub fn has_status(self, expected: HttpCode) -> E2eResult<Self> {
        if self.outcome.status() == expected.code() {
            return Ok(self);
        }
        Err(E2eError::AssertionFailed(format!(
            "Expected HTTP status {} but was {}",
            expected,
            self.actual()
        )))
    }

    /// Status must be one of `expected`. An empty slice is an authoring
    /// error and never passes.
    pub fn has_status_in(self, expected: &[HttpCode]) -> E2eResult<Self> {
        let set = ExpectedStatusSet::try_from(expected)?;
        self.has_status_in_set(&set)
    }

    pub fn has_status_in_set(self, expected: &ExpectedStatusSet) -> E2eResult<Self> {
        if expected.contains(self.outcome.status()) {
            return Ok(self);
        }
        Err(E2eError::AssertionFailed(format!(
            "Expected HTTP status to be one of [{}], but was {}",
            expected.describe(),
            self.actual()
        )))
    }

    /// Status must be 2xx.
    pub fn is_success(self) -> E2eResult<Self> {
        if self.outcome.is_success() {
            return Ok(self);
        }
        Err(E2eError::AssertionFailed(format!(
            "Expected a successful HTTP status but was {}",
            self.actual()
        )))
    }

    /// Body must deserialize as `T`.
    pub fn body_as<T: DeserializeOwned>(self) -> E2eResult<T> {
        self.outcome.json().map_err(|e| {
            E2eError::AssertionFailed(format!(
                "Response body is not a valid {}: {}",
                std::any::type_name::<T>().rsplit("::").next().unwrap_or("value"),
                e
            ))
        })
    }

    /// Body must be an entity carrying `id`; returns the entity.
    pub fn has_entity_id<E: Entity>(self, id: EntityId) -> E2eResult<E> {
        let entity: E = self.body_as()?;
        if entity.id() != id {
            return Err(E2eError::AssertionFailed(format!(
                "Expected {} with id {} but the response carried id {}",
                E::KIND,
                id,
                entity.id()
            )));
        }
        Ok(entity)
    }

    /// Body must be a JSON array containing an object with `id`.
    pub fn list_contains_id(self, id: EntityId) -> E2eResult<Self> {
        let items: Vec<serde_json::Value> = self.body_as()?;
        let found = items
            .iter()
            .filter_map(|item| item.get("id").and_then(serde_json::Value::as_i64))
            .any(|candidate| candidate == i64::from(id));
        if found {
            return Ok(self);
        }
        Err(E2eError::AssertionFailed(format!(
            "Expected the list to contain id {} ({} item(s) returned)",
            id,
            items.len()
        )))
    }
}
