//! Declarative YAML scenario catalog

use bookstore_common::{EntityKind, HttpCode};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};
use crate::fixtures::MissingCase;

/// One feature file: a named group of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpec {
    /// Unique name for this feature
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags inherited by every scenario in the feature
    #[serde(default)]
    pub tags: Vec<String>,

    pub scenarios: Vec<ScenarioSpec>,
}

/// A single business-readable test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<ScenarioStep>,
}

/// A step acting on one entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub entity: EntityKind,

    #[serde(flatten)]
    pub action: StepAction,
}

impl ScenarioStep {
    pub fn new(entity: EntityKind, action: StepAction) -> Self {
        Self { entity, action }
    }

    pub fn book(action: StepAction) -> Self {
        Self::new(EntityKind::Book, action)
    }

    pub fn author(action: StepAction) -> Self {
        Self::new(EntityKind::Author, action)
    }
}

impl std::fmt::Display for ScenarioStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.entity, self.action.name())
    }
}

/// What a step does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    // Given
    /// Build a random entity with a fresh id as the current payload
    UniqueData,

    /// Make sure a current entity exists remotely
    Exists,

    /// A current entity existed and has been deleted
    Removed,

    // When
    /// Create the current payload
    Add,

    /// Update the current entity with the kind's edit
    Edit,

    /// Delete the current entity
    Remove,

    /// Delete the current entity once more
    RemoveAgain,

    /// Fetch the current entity
    OpenDetails,

    /// Fetch an entity that is not there
    OpenMissing { case: MissingCase },

    /// Create from a baseline payload lacking one labelled field
    AddWithMissing { field: String },

    /// Update an entity with a payload whose id disagrees with the path
    AmbiguousUpdate,

    // Then
    /// Last response has one of these statuses
    ExpectStatus {
        #[serde(default)]
        codes: Vec<HttpCode>,
    },

    /// The current entity shows up in its details and in the list
    VisibleInListAndDetails,

    /// The current entity's required details are filled in
    DetailsComplete,

    /// The last response matches the payload it was created from
    DetailsMatchPayload,

    /// The fetched entity carries the edit
    ChangesVisible,
}

impl StepAction {
    /// Snake-case action name as written in YAML
    pub fn name(&self) -> &'static str {
        match self {
            StepAction::UniqueData => "unique_data",
            StepAction::Exists => "exists",
            StepAction::Removed => "removed",
            StepAction::Add => "add",
            StepAction::Edit => "edit",
            StepAction::Remove => "remove",
            StepAction::RemoveAgain => "remove_again",
            StepAction::OpenDetails => "open_details",
            StepAction::OpenMissing { .. } => "open_missing",
            StepAction::AddWithMissing { .. } => "add_with_missing",
            StepAction::AmbiguousUpdate => "ambiguous_update",
            StepAction::ExpectStatus { .. } => "expect_status",
            StepAction::VisibleInListAndDetails => "visible_in_list_and_details",
            StepAction::DetailsComplete => "details_complete",
            StepAction::DetailsMatchPayload => "details_match_payload",
            StepAction::ChangesVisible => "changes_visible",
        }
    }
}

/// A scenario together with the feature it came from
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub feature: String,
    pub scenario: ScenarioSpec,
    /// Feature tags followed by the scenario's own
    pub tags: Vec<String>,
}

impl CatalogEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl FeatureSpec {
    /// Parse a feature from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a feature from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load all features from a directory, sorted by file name
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut features = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            features.push(Self::from_file(entry.path())?);
        }

        Ok(features)
    }

    /// Flatten into catalog entries
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.scenarios
            .iter()
            .map(|scenario| CatalogEntry {
                feature: self.name.clone(),
                scenario: scenario.clone(),
                tags: self.tags.iter().chain(&scenario.tags).cloned().collect(),
            })
            .collect()
    }
}

/// Every scenario of every feature, in load order
pub fn catalog(features: &[FeatureSpec]) -> Vec<CatalogEntry> {
    features.iter().flat_map(FeatureSpec::entries).collect()
}

/// Filter entries by tag
pub fn filter_by_tag(entries: Vec<CatalogEntry>, tag: &str) -> Vec<CatalogEntry> {
    entries.into_iter().filter(|e| e.has_tag(tag)).collect()
}
