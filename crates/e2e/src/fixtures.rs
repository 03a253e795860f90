//! Fixture helpers shared by the Book and Author steps
//!
//! Everything here is generic over [`Fixture`], so both kinds go through the
//! same create/verify/delete paths and differ only in their data.

use bookstore_common::{Author, Book, EntityId, EntityKind, HttpCode, INVALID_ID, NEVER_EXISTED_ID};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{Bookstore, EntityApi, HttpOutcome};
use crate::assertions::assert_that;
use crate::builder::{AuthorBuilder, BookBuilder};
use crate::error::{AuthoringError, E2eError, E2eResult};
use crate::payload::PayloadSchema;
use crate::world::{EntityContext, ScenarioWorld};

/// Statuses accepted when the API confirms a create.
pub const CREATED_STATUSES: [HttpCode; 2] = [HttpCode::Ok, HttpCode::Created];

/// Marker appended to a book title by the edit step.
pub const BOOK_EDIT_MARKER: &str = "(2nd ed.)";

/// Suffix appended to an author's first name by the edit step.
pub const AUTHOR_EDIT_SUFFIX: &str = " Jr.";

/// An entity kind the scenarios can create, edit and verify.
pub trait Fixture: PayloadSchema {
    /// Random realistic entity with the given id.
    fn random_with_id(id: EntityId) -> Self;

    /// Copy carrying the kind's "selected information" edit.
    fn edited(&self) -> Self;

    /// The fetched entity shows the edit.
    fn check_edited(&self) -> E2eResult<()>;

    /// Required details are present and sensible.
    fn check_complete(&self) -> E2eResult<()>;

    /// Field compared when checking details against the payload.
    fn identifying_field(&self) -> (&'static str, &str);

    fn api(store: &Bookstore) -> &dyn EntityApi<Self>;

    fn context(world: &ScenarioWorld) -> &EntityContext<Self>;

    fn context_mut(world: &mut ScenarioWorld) -> &mut EntityContext<Self>;
}

fn require_non_blank(kind: EntityKind, field: &str, value: &str) -> E2eResult<()> {
    if value.trim().is_empty() {
        return Err(E2eError::AssertionFailed(format!(
            "{kind} {field} should not be blank"
        )));
    }
    Ok(())
}

impl Fixture for Book {
    fn random_with_id(id: EntityId) -> Self {
        BookBuilder::new().with_id(id).build_random()
    }

    fn edited(&self) -> Self {
        BookBuilder::from_book(self)
            .with_title(format!("{} {}", self.title, BOOK_EDIT_MARKER))
            .with_page_count(self.page_count + 1)
            .build()
    }

    fn check_edited(&self) -> E2eResult<()> {
        if self.title.contains(BOOK_EDIT_MARKER) {
            return Ok(());
        }
        Err(E2eError::AssertionFailed(format!(
            "Updated book title should contain '{}' but was '{}'",
            BOOK_EDIT_MARKER, self.title
        )))
    }

    fn check_complete(&self) -> E2eResult<()> {
        require_non_blank(EntityKind::Book, "title", &self.title)?;
        require_non_blank(EntityKind::Book, "description", &self.description)?;
        require_non_blank(EntityKind::Book, "publish date", &self.publish_date)?;
        if self.page_count <= 0 {
            return Err(E2eError::AssertionFailed(format!(
                "book page count should be greater than 0 but was {}",
                self.page_count
            )));
        }
        Ok(())
    }

    fn identifying_field(&self) -> (&'static str, &str) {
        ("title", &self.title)
    }

    fn api(store: &Bookstore) -> &dyn EntityApi<Self> {
        store.books.as_ref()
    }

    fn context(world: &ScenarioWorld) -> &EntityContext<Self> {
        world.books()
    }

    fn context_mut(world: &mut ScenarioWorld) -> &mut EntityContext<Self> {
        world.books_mut()
    }
}

impl Fixture for Author {
    fn random_with_id(id: EntityId) -> Self {
        AuthorBuilder::new().with_id(id).with_id_book(id).build_random()
    }

    fn edited(&self) -> Self {
        AuthorBuilder::from_author(self)
            .with_first_name(format!("{}{}", self.first_name, AUTHOR_EDIT_SUFFIX))
            .build()
    }

    fn check_edited(&self) -> E2eResult<()> {
        if self.first_name.ends_with(AUTHOR_EDIT_SUFFIX) {
            return Ok(());
        }
        Err(E2eError::AssertionFailed(format!(
            "Updated author first name should end with '{}' but was '{}'",
            AUTHOR_EDIT_SUFFIX.trim(),
            self.first_name
        )))
    }

    fn check_complete(&self) -> E2eResult<()> {
        require_non_blank(EntityKind::Author, "first name", &self.first_name)?;
        require_non_blank(EntityKind::Author, "last name", &self.last_name)
    }

    fn identifying_field(&self) -> (&'static str, &str) {
        ("firstName", &self.first_name)
    }

    fn api(store: &Bookstore) -> &dyn EntityApi<Self> {
        store.authors.as_ref()
    }

    fn context(world: &ScenarioWorld) -> &EntityContext<Self> {
        world.authors()
    }

    fn context_mut(world: &mut ScenarioWorld) -> &mut EntityContext<Self> {
        world.authors_mut()
    }
}

/// Why a lookup is expected to find nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCase {
    #[serde(alias = "was already removed")]
    AlreadyRemoved,
    #[serde(alias = "never existed")]
    NeverExisted,
    #[serde(alias = "has an invalid identifier")]
    InvalidIdentifier,
}

impl MissingCase {
    /// Parse the business phrasing, e.g. "was already removed".
    pub fn from_phrase(kind: EntityKind, phrase: &str) -> Result<Self, AuthoringError> {
        match phrase.trim() {
            "was already removed" | "already_removed" => Ok(MissingCase::AlreadyRemoved),
            "never existed" | "never_existed" => Ok(MissingCase::NeverExisted),
            "has an invalid identifier" | "invalid_identifier" => Ok(MissingCase::InvalidIdentifier),
            other => Err(AuthoringError::UnsupportedCase {
                kind,
                case: other.to_string(),
            }),
        }
    }
}

/// Turn a failed expectation in a precondition into a fixture error.
fn as_fixture(step: &str, result: E2eResult<()>) -> E2eResult<()> {
    result.map_err(|e| match e {
        E2eError::AssertionFailed(reason) => E2eError::fixture(step, reason),
        other => other,
    })
}

fn expect_created(step: &str, outcome: &HttpOutcome) -> E2eResult<()> {
    as_fixture(
        step,
        assert_that(outcome).has_status_in(&CREATED_STATUSES).map(|_| ()),
    )
}

fn expect_deleted(step: &str, outcome: &HttpOutcome) -> E2eResult<()> {
    as_fixture(step, assert_that(outcome).has_status(HttpCode::Ok).map(|_| ()))
}

/// Context key set once an entity of `kind` is confirmed created.
pub fn created_flag(kind: EntityKind) -> String {
    format!("{kind}.created")
}

/// Put a random payload in the world unless one is already there.
pub fn ensure_payload<E: Fixture>(world: &mut ScenarioWorld) -> E {
    let context = E::context_mut(world);
    if let Some(existing) = context.last_payload() {
        return existing.clone();
    }
    let entity = E::random_with_id(bookstore_common::unique_id());
    debug!(kind = %E::KIND, id = entity.id(), "Created random payload");
    context.set_payload(entity.clone());
    entity
}

/// Create a random entity remotely and return it. The id is tracked for
/// cleanup as soon as the request goes out; the caller decides whether it
/// becomes current.
pub async fn create_fixture<E: Fixture>(
    api: &Bookstore,
    world: &mut ScenarioWorld,
    step: &str,
) -> E2eResult<E> {
    let entity = E::random_with_id(bookstore_common::unique_id());
    E::context_mut(world).track_for_cleanup(entity.id());
    let outcome = E::api(api).create(&entity).await?;
    expect_created(step, &outcome)?;
    debug!(kind = %E::KIND, id = entity.id(), "Created fixture");
    Ok(entity)
}

/// Make sure a current entity exists remotely. Idempotent: a world that
/// already holds a payload is left alone.
pub async fn ensure_exists<E: Fixture>(api: &Bookstore, world: &mut ScenarioWorld) -> E2eResult<E> {
    if let Some(existing) = E::context(world).last_payload() {
        return Ok(existing.clone());
    }
    let entity = create_fixture::<E>(api, world, "exists").await?;
    E::context_mut(world).track_created(entity.clone());
    world.set_flag(created_flag(E::KIND));
    Ok(entity)
}

/// Delete `id` as part of a precondition; anything but OK is a fixture error.
pub async fn delete_fixture<E: Fixture>(
    api: &Bookstore,
    world: &mut ScenarioWorld,
    id: EntityId,
    step: &str,
) -> E2eResult<()> {
    let outcome = E::api(api).delete(id).await?;
    expect_deleted(step, &outcome)?;
    E::context_mut(world).forget_deleted(id);
    debug!(kind = %E::KIND, id, "Deleted fixture");
    Ok(())
}

/// Identifier to look up for a missing-entity case. The current entity is
/// left untouched.
pub async fn id_for_case<E: Fixture>(
    api: &Bookstore,
    world: &mut ScenarioWorld,
    case: MissingCase,
) -> E2eResult<EntityId> {
    match case {
        MissingCase::AlreadyRemoved => {
            let entity = create_fixture::<E>(api, world, "open_missing").await?;
            delete_fixture::<E>(api, world, entity.id(), "open_missing").await?;
            Ok(entity.id())
        }
        MissingCase::NeverExisted => Ok(NEVER_EXISTED_ID),
        MissingCase::InvalidIdentifier => Ok(INVALID_ID),
    }
}

/// Fetch `id`; it must come back OK with the same id.
pub async fn fetch<E: Fixture>(api: &Bookstore, id: EntityId) -> E2eResult<E> {
    let outcome = E::api(api).get(id).await?;
    assert_that(&outcome).has_status(HttpCode::Ok)?.has_entity_id(id)
}

/// The entity with `id` shows up both in its details and in the list.
pub async fn verify_in_list_and_details<E: Fixture>(api: &Bookstore, id: EntityId) -> E2eResult<()> {
    fetch::<E>(api, id).await?;
    let list = E::api(api).list().await?;
    assert_that(&list).has_status(HttpCode::Ok)?.list_contains_id(id)?;
    debug!(kind = %E::KIND, id, "Verified entity in list and details");
    Ok(())
}
