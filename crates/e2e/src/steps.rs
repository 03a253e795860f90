//! Step execution
//!
//! Binds each [`StepAction`] to the fixture helpers, the gateways and the
//! assertion DSL. Responses from "when" steps are stored in the world and
//! judged by later "then" steps; only preconditions assert on the spot.

use bookstore_common::{Author, Book, EntityId, EntityKind, HttpCode};
use tracing::debug;

use crate::api::Bookstore;
use crate::assertions::{assert_that, ExpectedStatusSet};
use crate::error::{AuthoringError, E2eError, E2eResult};
use crate::fixtures::{self, created_flag, Fixture};
use crate::payload::PayloadMapBuilder;
use crate::spec::{ScenarioStep, StepAction};
use crate::world::ScenarioWorld;

/// Run one step against the API, reading and updating `world`.
pub async fn execute(api: &Bookstore, world: &mut ScenarioWorld, step: &ScenarioStep) -> E2eResult<()> {
    debug!(step = %step, "Executing step");
    match step.entity {
        EntityKind::Book => execute_for::<Book>(api, world, &step.action).await,
        EntityKind::Author => execute_for::<Author>(api, world, &step.action).await,
    }
}

fn current_id<E: Fixture>(world: &ScenarioWorld, action: &StepAction) -> E2eResult<EntityId> {
    E::context(world).last_id().ok_or_else(|| {
        AuthoringError::MissingState {
            step: action.name().to_string(),
            kind: E::KIND,
        }
        .into()
    })
}

fn current_payload<E: Fixture>(world: &ScenarioWorld, action: &StepAction) -> E2eResult<E> {
    E::context(world).last_payload().cloned().ok_or_else(|| {
        AuthoringError::MissingState {
            step: action.name().to_string(),
            kind: E::KIND,
        }
        .into()
    })
}

async fn execute_for<E: Fixture>(
    api: &Bookstore,
    world: &mut ScenarioWorld,
    action: &StepAction,
) -> E2eResult<()> {
    match action {
        StepAction::UniqueData => {
            let entity = E::random_with_id(bookstore_common::unique_id());
            debug!(kind = %E::KIND, id = entity.id(), "Prepared unique data");
            E::context_mut(world).set_payload(entity);
        }

        StepAction::Exists => {
            fixtures::ensure_exists::<E>(api, world).await?;
        }

        StepAction::Removed => {
            let entity = fixtures::ensure_exists::<E>(api, world).await?;
            fixtures::delete_fixture::<E>(api, world, entity.id(), "removed").await?;
        }

        StepAction::Add => {
            let entity = fixtures::ensure_payload::<E>(world);
            let outcome = E::api(api).create(&entity).await?;
            // tracked whatever the status: a half-failed create may still
            // have left something behind
            E::context_mut(world).track_created(entity);
            if outcome.is_success() {
                world.set_flag(created_flag(E::KIND));
            }
            world.record_response(E::KIND, outcome);
        }

        StepAction::Edit => {
            let id = current_id::<E>(world, action)?;
            let updated = current_payload::<E>(world, action)?.edited();
            let outcome = E::api(api).update(id, &updated).await?;
            let verdict = assert_that(&outcome).has_status(HttpCode::Ok).map(|_| ());
            world.record_response(E::KIND, outcome);
            verdict?;
            E::context_mut(world).set_payload(updated);
        }

        StepAction::Remove => {
            let id = current_id::<E>(world, action)?;
            let outcome = E::api(api).delete(id).await?;
            let verdict = assert_that(&outcome).has_status(HttpCode::Ok).map(|_| ());
            world.record_response(E::KIND, outcome);
            verdict?;
            E::context_mut(world).forget_deleted(id);
        }

        StepAction::RemoveAgain => {
            let id = current_id::<E>(world, action)?;
            let outcome = E::api(api).delete(id).await?;
            if outcome.is_success() {
                E::context_mut(world).forget_deleted(id);
            }
            world.record_response(E::KIND, outcome);
        }

        StepAction::OpenDetails => {
            let id = current_id::<E>(world, action)?;
            let outcome = E::api(api).get(id).await?;
            world.record_response(E::KIND, outcome);
        }

        StepAction::OpenMissing { case } => {
            let id = fixtures::id_for_case::<E>(api, world, *case).await?;
            debug!(kind = %E::KIND, id, ?case, "Opening missing entity");
            let outcome = E::api(api).get(id).await?;
            world.record_response(E::KIND, outcome);
        }

        StepAction::AddWithMissing { field } => {
            let builder = PayloadMapBuilder::<E>::valid().remove(field)?;
            let outcome = E::api(api).create_raw(&builder.build()).await?;
            // a lenient API may accept it anyway; make sure it gets removed
            if outcome.is_success() {
                if let Some(id) = builder.id() {
                    E::context_mut(world).track_id(id);
                }
            }
            world.record_response(E::KIND, outcome);
        }

        StepAction::AmbiguousUpdate => {
            let original = fixtures::create_fixture::<E>(api, world, "ambiguous_update").await?;
            let path_id = original.id();
            E::context_mut(world).track_created(original.clone());

            let mut mismatched: serde_json::Value = serde_json::to_value(&original)?;
            mismatched["id"] = serde_json::json!(path_id.saturating_add(1));
            let mismatched: E = serde_json::from_value(mismatched)?;

            debug!(path_id, payload_id = mismatched.id(), "Attempting ambiguous update");
            let outcome = E::api(api).update(path_id, &mismatched).await?;
            world.record_response(E::KIND, outcome);
        }

        StepAction::ExpectStatus { codes } => {
            let expected = ExpectedStatusSet::try_from(codes.as_slice())?;
            let outcome = world.last_response().ok_or_else(|| E2eError::from(AuthoringError::MissingState {
                step: action.name().to_string(),
                kind: E::KIND,
            }))?;
            match expected.codes() {
                [single] => assert_that(outcome).has_status(*single)?,
                _ => assert_that(outcome).has_status_in_set(&expected)?,
            };
        }

        StepAction::VisibleInListAndDetails => {
            let id = current_id::<E>(world, action)?;
            let payload = current_payload::<E>(world, action)?;
            let fetched = fixtures::fetch::<E>(api, id).await?;
            if fetched.id() != payload.id() {
                return Err(E2eError::AssertionFailed(format!(
                    "Retrieved {} id {} does not match expected id {}",
                    E::KIND,
                    fetched.id(),
                    payload.id()
                )));
            }
            fixtures::verify_in_list_and_details::<E>(api, id).await?;
        }

        StepAction::DetailsComplete => {
            let id = current_id::<E>(world, action)?;
            fixtures::fetch::<E>(api, id).await?.check_complete()?;
        }

        StepAction::DetailsMatchPayload => {
            let payload = current_payload::<E>(world, action)?;
            let outcome = E::context(world).last_response().ok_or_else(|| {
                E2eError::from(AuthoringError::MissingState {
                    step: action.name().to_string(),
                    kind: E::KIND,
                })
            })?;
            let retrieved: E = assert_that(outcome).has_status(HttpCode::Ok)?.body_as()?;
            let (field, expected) = payload.identifying_field();
            let (_, actual) = retrieved.identifying_field();
            if expected != actual {
                return Err(E2eError::AssertionFailed(format!(
                    "Retrieved {} {} '{}' should match the original '{}'",
                    E::KIND,
                    field,
                    actual,
                    expected
                )));
            }
        }

        StepAction::ChangesVisible => {
            let id = current_id::<E>(world, action)?;
            fixtures::fetch::<E>(api, id).await?.check_edited()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{EntityApi, HttpOutcome};
    use crate::fixtures::MissingCase;
    use crate::payload::RawPayload;
    use async_trait::async_trait;
    use bookstore_common::Entity;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Answers every call with one status and records the calls made.
    struct CannedApi {
        status: u16,
        calls: Mutex<Vec<String>>,
    }

    impl CannedApi {
        fn answering(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn record(&self, call: String) -> E2eResult<HttpOutcome> {
            self.calls.lock().push(call);
            Ok(HttpOutcome::new(self.status, ""))
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl<E: Entity> EntityApi<E> for CannedApi {
        async fn list(&self) -> E2eResult<HttpOutcome> {
            self.record("list".into())
        }

        async fn get(&self, id: EntityId) -> E2eResult<HttpOutcome> {
            self.record(format!("get {id}"))
        }

        async fn create(&self, entity: &E) -> E2eResult<HttpOutcome> {
            self.record(format!("create {}", entity.id()))
        }

        async fn create_raw(&self, payload: &RawPayload) -> E2eResult<HttpOutcome> {
            self.record(format!("create_raw {}", payload.len()))
        }

        async fn update(&self, id: EntityId, entity: &E) -> E2eResult<HttpOutcome> {
            self.record(format!("update {id} {}", entity.id()))
        }

        async fn delete(&self, id: EntityId) -> E2eResult<HttpOutcome> {
            self.record(format!("delete {id}"))
        }
    }

    fn store(books: Arc<CannedApi>) -> Bookstore {
        Bookstore::new(books, CannedApi::answering(200))
    }

    #[tokio::test]
    async fn test_rejected_add_is_still_tracked() {
        let books = CannedApi::answering(500);
        let api = store(books.clone());
        let mut world = ScenarioWorld::new();

        execute(&api, &mut world, &ScenarioStep::book(StepAction::Add)).await.unwrap();

        let id = world.books().last_id().unwrap();
        assert_eq!(books.calls(), vec![format!("create {id}")]);
        assert_eq!(world.books().tracked(), Some(id));
        assert!(!world.flag("book.created"));
        assert_eq!(world.last_response().unwrap().status(), 500);
    }

    #[tokio::test]
    async fn test_add_sets_created_flag() {
        let api = store(CannedApi::answering(200));
        let mut world = ScenarioWorld::new();
        execute(&api, &mut world, &ScenarioStep::book(StepAction::Add)).await.unwrap();
        assert!(world.flag("book.created"));
    }

    #[tokio::test]
    async fn test_remove_untracks_but_keeps_current_id() {
        let books = CannedApi::answering(200);
        let api = store(books.clone());
        let mut world = ScenarioWorld::new();
        world.books_mut().track_id(42);

        execute(&api, &mut world, &ScenarioStep::book(StepAction::Remove)).await.unwrap();
        assert_eq!(world.books().tracked(), None);
        assert_eq!(world.books().last_id(), Some(42));

        execute(&api, &mut world, &ScenarioStep::book(StepAction::OpenDetails)).await.unwrap();
        assert_eq!(books.calls(), vec!["delete 42", "get 42"]);
    }

    #[tokio::test]
    async fn test_remove_requires_ok() {
        let api = store(CannedApi::answering(404));
        let mut world = ScenarioWorld::new();
        world.books_mut().track_id(1);

        let err = execute(&api, &mut world, &ScenarioStep::book(StepAction::Remove))
            .await
            .unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(_)));
        assert_eq!(world.books().tracked(), Some(1));
        assert_eq!(world.last_response().unwrap().status(), 404);
    }

    #[tokio::test]
    async fn test_rejected_edit_still_records_response() {
        let api = store(CannedApi::answering(500));
        let mut world = ScenarioWorld::new();
        let book = Book::random_with_id(3);
        world.books_mut().track_created(book.clone());

        let err = execute(&api, &mut world, &ScenarioStep::book(StepAction::Edit))
            .await
            .unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(_)));
        assert_eq!(world.books().last_response().unwrap().status(), 500);
        assert_eq!(world.books().last_payload(), Some(&book));
    }

    #[tokio::test]
    async fn test_open_removed_leaves_current_entity_alone() {
        let books = CannedApi::answering(200);
        let api = store(books.clone());
        let mut world = ScenarioWorld::new();
        world.books_mut().track_id(7);

        let step = ScenarioStep::book(StepAction::OpenMissing {
            case: MissingCase::AlreadyRemoved,
        });
        execute(&api, &mut world, &step).await.unwrap();

        let calls = books.calls();
        assert_eq!(calls.len(), 3);
        let removed = calls[0].trim_start_matches("create ").to_string();
        assert_eq!(calls[1], format!("delete {removed}"));
        assert_eq!(calls[2], format!("get {removed}"));
        assert_eq!(world.books().last_id(), Some(7));
        assert_eq!(world.books().tracked_all(), &[7]);
    }

    #[tokio::test]
    async fn test_failed_fixture_create_is_still_tracked() {
        let books = CannedApi::answering(500);
        let api = store(books.clone());
        let mut world = ScenarioWorld::new();

        let step = ScenarioStep::book(StepAction::OpenMissing {
            case: MissingCase::AlreadyRemoved,
        });
        let err = execute(&api, &mut world, &step).await.unwrap_err();
        assert!(matches!(err, E2eError::Fixture { .. }));

        let id = world.books().tracked().unwrap();
        assert_eq!(books.calls(), vec![format!("create {id}")]);
        assert_eq!(world.books().last_id(), None);
    }

    #[tokio::test]
    async fn test_open_missing_uses_sentinels() {
        let books = CannedApi::answering(404);
        let api = store(books.clone());
        let mut world = ScenarioWorld::new();

        for case in [MissingCase::NeverExisted, MissingCase::InvalidIdentifier] {
            let step = ScenarioStep::book(StepAction::OpenMissing { case });
            execute(&api, &mut world, &step).await.unwrap();
        }
        assert_eq!(books.calls(), vec!["get 999999999", "get -1"]);
        assert!(world.tracked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_ambiguous_update_sends_mismatched_id() {
        let books = CannedApi::answering(200);
        let api = store(books.clone());
        let mut world = ScenarioWorld::new();

        execute(&api, &mut world, &ScenarioStep::book(StepAction::AmbiguousUpdate))
            .await
            .unwrap();

        let id = world.books().tracked().unwrap();
        assert_eq!(
            books.calls(),
            vec![format!("create {id}"), format!("update {id} {}", id + 1)]
        );
    }

    #[tokio::test]
    async fn test_expect_status_forms() {
        let api = store(CannedApi::answering(404));
        let mut world = ScenarioWorld::new();
        world.record_response(EntityKind::Book, HttpOutcome::new(404, ""));

        let single = ScenarioStep::book(StepAction::ExpectStatus { codes: vec![HttpCode::NotFound] });
        execute(&api, &mut world, &single).await.unwrap();

        let set = ScenarioStep::book(StepAction::ExpectStatus {
            codes: vec![HttpCode::BadRequest, HttpCode::NotFound],
        });
        execute(&api, &mut world, &set).await.unwrap();

        let empty = ScenarioStep::book(StepAction::ExpectStatus { codes: vec![] });
        let err = execute(&api, &mut world, &empty).await.unwrap_err();
        assert!(err.is_authoring());
    }

    #[tokio::test]
    async fn test_expect_status_without_response_is_authoring_error() {
        let api = store(CannedApi::answering(200));
        let mut world = ScenarioWorld::new();
        let step = ScenarioStep::author(StepAction::ExpectStatus { codes: vec![HttpCode::Ok] });
        let err = execute(&api, &mut world, &step).await.unwrap_err();
        assert!(err.is_authoring());
    }

    #[tokio::test]
    async fn test_add_with_missing_sends_reduced_payload() {
        let books = CannedApi::answering(400);
        let api = store(books.clone());
        let mut world = ScenarioWorld::new();

        let step = ScenarioStep::book(StepAction::AddWithMissing { field: "Page Count".into() });
        execute(&api, &mut world, &step).await.unwrap();

        assert_eq!(books.calls(), vec!["create_raw 5"]);
        assert!(world.tracked_ids().is_empty());
    }
}
