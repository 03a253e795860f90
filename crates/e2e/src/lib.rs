//! Bookstore acceptance harness
//!
//! Drives the Books and Authors REST API through business-readable
//! scenarios:
//! - Loads declarative YAML feature files into a scenario catalog
//! - Builds unique, realistic entities and raw payloads with fields removed
//! - Sends them through typed HTTP gateways with traced request logging
//! - Checks responses with a small assertion DSL
//! - Deletes whatever a scenario created, whatever its outcome
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ScenarioRunner (Rust)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  per scenario                                               │
//! │    ├── ScenarioWorld::new()                                 │
//! │    ├── steps::execute(api, world, step)  for each step      │
//! │    └── cleanup(api, world)               always             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FeatureSpec (YAML)                                         │
//! │    ├── name, description, tags                              │
//! │    └── scenarios: [ScenarioSpec]                            │
//! │          └── steps: [{ entity, action, ... }]               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Bookstore                                                  │
//! │    ├── books:   Arc<dyn EntityApi<Book>>                    │
//! │    └── authors: Arc<dyn EntityApi<Author>>                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod assertions;
pub mod builder;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod payload;
pub mod random;
pub mod runner;
pub mod spec;
pub mod steps;
pub mod world;

pub use api::{Bookstore, EntityApi, HttpOutcome, RestApi};
pub use assertions::{assert_that, ExpectedStatusSet, ResponseAssertion};
pub use builder::{AuthorBuilder, BookBuilder};
pub use cleanup::{cleanup, CleanupReport};
pub use config::HarnessConfig;
pub use error::{AuthoringError, E2eError, E2eResult};
pub use payload::{PayloadMapBuilder, RawPayload};
pub use runner::{ScenarioResult, ScenarioRunner, ScenarioStatus, SuiteResult};
pub use spec::{CatalogEntry, FeatureSpec, ScenarioSpec, ScenarioStep, StepAction};
pub use world::ScenarioWorld;
