//! API gateways - thin Books/Authors operations returning raw outcomes
//!
//! Gateways never judge a response. They hand back the status, body and
//! timing, and leave verdicts to the assertion layer. A transport failure
//! (connection refused, timeout) is the only thing reported as an error.

use async_trait::async_trait;
use bookstore_common::{Author, Book, Entity, EntityId, HttpCode};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::error::{E2eError, E2eResult};
use crate::payload::RawPayload;

/// Status and body of one API call
#[derive(Debug, Clone, PartialEq)]
pub struct HttpOutcome {
    status: u16,
    body: String,
    elapsed: Duration,
}

impl HttpOutcome {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Named status, if the code is one the harness knows
    pub fn code(&self) -> Option<HttpCode> {
        HttpCode::resolve(self.status)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> E2eResult<T> {
        serde_json::from_str(&self.body).map_err(E2eError::from)
    }
}

/// Operations the harness needs from one bookstore collection.
#[async_trait]
pub trait EntityApi<E: Entity>: Send + Sync {
    async fn list(&self) -> E2eResult<HttpOutcome>;

    async fn get(&self, id: EntityId) -> E2eResult<HttpOutcome>;

    async fn create(&self, entity: &E) -> E2eResult<HttpOutcome>;

    /// Create from an arbitrary, possibly invalid, payload.
    async fn create_raw(&self, payload: &RawPayload) -> E2eResult<HttpOutcome>;

    async fn update(&self, id: EntityId, entity: &E) -> E2eResult<HttpOutcome>;

    async fn delete(&self, id: EntityId) -> E2eResult<HttpOutcome>;
}

/// REST gateway for one collection, e.g. `/api/v1/Books`
pub struct RestApi<E> {
    client: Client,
    collection_url: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RestApi<E> {
    pub fn new(client: Client, api_root: &str) -> Self {
        Self {
            client,
            collection_url: format!("{}{}", api_root.trim_end_matches('/'), E::RESOURCE),
            _entity: PhantomData,
        }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: EntityId) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
    ) -> E2eResult<HttpOutcome> {
        let trace = trace_id();
        info!("[{}] → {} {}", trace, method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            if tracing::enabled!(tracing::Level::DEBUG) {
                debug!("[{}] payload:\n{}", trace, serde_json::to_string_pretty(body)?);
            }
            request = request.json(body);
        }

        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let elapsed = start.elapsed();

        info!(
            "[{}] ← {} {} ({} ms)",
            trace,
            status,
            HttpCode::name_of(status),
            elapsed.as_millis()
        );
        if !text.trim().is_empty() {
            debug!("[{}] response:\n{}", trace, pretty(&text));
        }

        Ok(HttpOutcome::new(status, text).with_elapsed(elapsed))
    }
}

#[async_trait]
impl<E: Entity> EntityApi<E> for RestApi<E> {
    async fn list(&self) -> E2eResult<HttpOutcome> {
        self.send::<()>(Method::GET, self.collection_url.clone(), None).await
    }

    async fn get(&self, id: EntityId) -> E2eResult<HttpOutcome> {
        self.send::<()>(Method::GET, self.item_url(id), None).await
    }

    async fn create(&self, entity: &E) -> E2eResult<HttpOutcome> {
        self.send(Method::POST, self.collection_url.clone(), Some(entity)).await
    }

    async fn create_raw(&self, payload: &RawPayload) -> E2eResult<HttpOutcome> {
        self.send(Method::POST, self.collection_url.clone(), Some(payload)).await
    }

    async fn update(&self, id: EntityId, entity: &E) -> E2eResult<HttpOutcome> {
        self.send(Method::PUT, self.item_url(id), Some(entity)).await
    }

    async fn delete(&self, id: EntityId) -> E2eResult<HttpOutcome> {
        self.send::<()>(Method::DELETE, self.item_url(id), None).await
    }
}

/// Both bookstore gateways, shared by every scenario of a run.
#[derive(Clone)]
pub struct Bookstore {
    pub books: Arc<dyn EntityApi<Book>>,
    pub authors: Arc<dyn EntityApi<Author>>,
}

impl Bookstore {
    pub fn new(books: Arc<dyn EntityApi<Book>>, authors: Arc<dyn EntityApi<Author>>) -> Self {
        Self { books, authors }
    }

    /// Build REST gateways over one shared HTTP client.
    pub fn connect(config: &HarnessConfig) -> E2eResult<Self> {
        config.validate()?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        info!("Bookstore API at {}", config.api_root());
        Ok(Self::new(
            Arc::new(RestApi::<Book>::new(client.clone(), config.api_root())),
            Arc::new(RestApi::<Author>::new(client, config.api_root())),
        ))
    }
}

impl std::fmt::Debug for Bookstore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bookstore").finish_non_exhaustive()
    }
}

/// Short id correlating a request with its response in the logs.
fn trace_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Pretty-print JSON, or return the text unchanged if it is not JSON.
fn pretty(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| text.to_string())
}
