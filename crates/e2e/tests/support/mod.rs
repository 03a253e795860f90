//! In-process fake bookstore for integration tests
//!
//! Serves `/api/v1/Books` and `/api/v1/Authors` from memory on an ephemeral
//! port. Missing required fields and mismatched update ids get 400, unknown
//! ids get 404. Every DELETE is counted so tests can check cleanup.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bookstore_common::{EntityId, EntityKind};
use bookstore_e2e::{Bookstore, HarnessConfig};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

const BOOK_FIELDS: &[&str] = &["id", "title", "description", "pageCount", "publishDate"];
const AUTHOR_FIELDS: &[&str] = &["id", "idBook", "firstName", "lastName"];

#[derive(Debug, Default)]
pub struct FakeState {
    books: BTreeMap<EntityId, Value>,
    authors: BTreeMap<EntityId, Value>,
    deletes: Vec<(EntityKind, EntityId)>,
    fail_deletes: bool,
}

impl FakeState {
    fn collection(&mut self, kind: EntityKind) -> &mut BTreeMap<EntityId, Value> {
        match kind {
            EntityKind::Book => &mut self.books,
            EntityKind::Author => &mut self.authors,
        }
    }
}

#[derive(Clone)]
struct Collection {
    kind: EntityKind,
    required: &'static [&'static str],
    state: Arc<Mutex<FakeState>>,
}

pub struct FakeBookstore {
    base_url: String,
    state: Arc<Mutex<FakeState>>,
    server: JoinHandle<()>,
}

impl FakeBookstore {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState::default()));
        let app = collection_routes(
            "/api/v1/Books",
            Collection {
                kind: EntityKind::Book,
                required: BOOK_FIELDS,
                state: state.clone(),
            },
        )
        .merge(collection_routes(
            "/api/v1/Authors",
            Collection {
                kind: EntityKind::Author,
                required: AUTHOR_FIELDS,
                state: state.clone(),
            },
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            server,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Harness configuration pointing at this server
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig {
            base_url: self.base_url.clone(),
            connect_timeout_ms: 1_000,
            request_timeout_ms: 5_000,
            ..HarnessConfig::default()
        }
    }

    pub fn bookstore(&self) -> Bookstore {
        Bookstore::connect(&self.config()).unwrap()
    }

    /// Every DELETE received, in order, whatever its outcome
    pub fn deletes(&self) -> Vec<(EntityKind, EntityId)> {
        self.state.lock().deletes.clone()
    }

    pub fn delete_count(&self, kind: EntityKind, id: EntityId) -> usize {
        self.state
            .lock()
            .deletes
            .iter()
            .filter(|(k, i)| *k == kind && *i == id)
            .count()
    }

    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        self.state.lock().collection(kind).contains_key(&id)
    }

    /// Number of stored entities of both kinds
    pub fn stored(&self) -> usize {
        let state = self.state.lock();
        state.books.len() + state.authors.len()
    }

    /// Answer every DELETE with 500 from now on
    pub fn fail_deletes(&self) {
        self.state.lock().fail_deletes = true;
    }
}

impl Drop for FakeBookstore {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn collection_routes(resource: &str, collection: Collection) -> Router {
    Router::new()
        .route(resource, get(list).post(create))
        .route(
            &format!("{resource}/:id"),
            get(fetch).put(update).delete(remove),
        )
        .with_state(collection)
}

fn problem(status: StatusCode, title: &str) -> Response {
    (
        status,
        Json(json!({ "title": title, "status": status.as_u16() })),
    )
        .into_response()
}

fn validate(collection: &Collection, body: &Value) -> Result<EntityId, Response> {
    let missing: Vec<_> = collection
        .required
        .iter()
        .filter(|field| body.get(**field).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(problem(
            StatusCode::BAD_REQUEST,
            &format!("One or more validation errors occurred: {missing:?}"),
        ));
    }
    body["id"]
        .as_i64()
        .and_then(|id| EntityId::try_from(id).ok())
        .ok_or_else(|| problem(StatusCode::BAD_REQUEST, "id must be an integer"))
}

async fn list(State(collection): State<Collection>) -> Json<Vec<Value>> {
    let mut state = collection.state.lock();
    Json(state.collection(collection.kind).values().cloned().collect())
}

async fn fetch(State(collection): State<Collection>, Path(id): Path<EntityId>) -> Response {
    let mut state = collection.state.lock();
    match state.collection(collection.kind).get(&id) {
        Some(entity) => Json(entity.clone()).into_response(),
        None => problem(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn create(State(collection): State<Collection>, Json(body): Json<Value>) -> Response {
    let id = match validate(&collection, &body) {
        Ok(id) => id,
        Err(rejection) => return rejection,
    };
    collection
        .state
        .lock()
        .collection(collection.kind)
        .insert(id, body.clone());
    Json(body).into_response()
}

async fn update(
    State(collection): State<Collection>,
    Path(id): Path<EntityId>,
    Json(body): Json<Value>,
) -> Response {
    let body_id = match validate(&collection, &body) {
        Ok(body_id) => body_id,
        Err(rejection) => return rejection,
    };
    if body_id != id {
        return problem(StatusCode::BAD_REQUEST, "Payload id does not match the address");
    }
    let mut state = collection.state.lock();
    let entities = state.collection(collection.kind);
    if !entities.contains_key(&id) {
        return problem(StatusCode::NOT_FOUND, "Not Found");
    }
    entities.insert(id, body.clone());
    Json(body).into_response()
}

async fn remove(State(collection): State<Collection>, Path(id): Path<EntityId>) -> Response {
    let mut state = collection.state.lock();
    state.deletes.push((collection.kind, id));
    if state.fail_deletes {
        return problem(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    }
    match state.collection(collection.kind).remove(&id) {
        Some(_) => StatusCode::OK.into_response(),
        None => problem(StatusCode::NOT_FOUND, "Not Found"),
    }
}
