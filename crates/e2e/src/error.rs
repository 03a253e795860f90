//! Error types for the acceptance harness

use bookstore_common::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    /// Expected-vs-actual mismatch raised by a verification step.
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// An API call needed to establish a precondition did not succeed.
    #[error("Fixture setup failed in '{step}': {reason}")]
    Fixture { step: String, reason: String },

    /// Defect in the scenario suite itself rather than the system under test.
    #[error("Authoring error: {0}")]
    Authoring(#[from] AuthoringError),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    pub fn fixture(step: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        E2eError::Fixture {
            step: step.into(),
            reason: reason.to_string(),
        }
    }

    /// `true` when the error points at the scenario suite rather than the API.
    pub fn is_authoring(&self) -> bool {
        matches!(self, E2eError::Authoring(_))
    }
}

/// Mistakes in how a scenario was written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthoringError {
    #[error("No field is mapped to label '{label}' for {kind}s")]
    UnmappedField { kind: EntityKind, label: String },

    #[error("No expected HTTP codes provided.")]
    EmptyExpectedStatus,

    #[error("Unsupported missing-{kind} case: {case}")]
    UnsupportedCase { kind: EntityKind, case: String },

    #[error("Step '{step}' needs a current {kind} but none was recorded")]
    MissingState { step: String, kind: EntityKind },
}

pub type E2eResult<T> = Result<T, E2eError>;
