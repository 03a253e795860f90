//! Scenario runner: fresh world per scenario, steps in order, cleanup always

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::api::Bookstore;
use crate::cleanup::{cleanup, CleanupReport};
use crate::config::HarnessConfig;
use crate::error::{E2eError, E2eResult};
use crate::spec::{catalog, filter_by_tag, CatalogEntry, FeatureSpec, ScenarioStep};
use crate::steps;
use crate::world::ScenarioWorld;

/// File the suite result is written to inside the output directory.
pub const RESULTS_FILE: &str = "scenario-results.json";

/// Environment description picked up by report tooling.
pub const ENVIRONMENT_FILE: &str = "environment.properties";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    /// The API misbehaved, or a step panicked
    Failed,
    /// The scenario itself is wrong
    HarnessError,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub feature: String,
    pub name: String,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    /// Steps started, including the one that failed
    pub steps_run: usize,
    pub error: Option<String>,
    pub cleanup: CleanupReport,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Result of running a batch of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub harness_errors: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn from_results(results: Vec<ScenarioResult>, duration_ms: u64) -> Self {
        let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            passed: count(ScenarioStatus::Passed),
            failed: count(ScenarioStatus::Failed),
            harness_errors: count(ScenarioStatus::HarnessError),
            duration_ms,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Runs catalog scenarios against one bookstore
pub struct ScenarioRunner {
    api: Bookstore,
    config: HarnessConfig,
}

impl ScenarioRunner {
    pub fn new(api: Bookstore, config: HarnessConfig) -> Self {
        Self { api, config }
    }

    /// Connect to the API described by `config`
    pub fn connect(config: HarnessConfig) -> E2eResult<Self> {
        let api = Bookstore::connect(&config)?;
        Ok(Self::new(api, config))
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn api(&self) -> &Bookstore {
        &self.api
    }

    fn load_catalog(&self) -> E2eResult<Vec<CatalogEntry>> {
        let features = FeatureSpec::load_all(&self.config.scenarios_dir)?;
        Ok(catalog(&features))
    }

    /// Run every scenario in the scenarios directory
    pub async fn run_all(&self) -> E2eResult<SuiteResult> {
        let entries = self.load_catalog()?;
        Ok(self.run_scenarios(&entries).await)
    }

    /// Run scenarios carrying `tag`, directly or through their feature
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<SuiteResult> {
        let entries = filter_by_tag(self.load_catalog()?, tag);
        Ok(self.run_scenarios(&entries).await)
    }

    /// Run the scenario called `name`
    pub async fn run_named(&self, name: &str) -> E2eResult<ScenarioResult> {
        let entry = self
            .load_catalog()?
            .into_iter()
            .find(|e| e.scenario.name == name)
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))?;
        Ok(self.run_scenario(&entry).await)
    }

    /// Run `entries` with at most `parallelism` in flight. Results keep the
    /// order of `entries`.
    pub async fn run_scenarios(&self, entries: &[CatalogEntry]) -> SuiteResult {
        let start = Instant::now();
        let parallelism = self.config.parallelism.max(1);
        info!("Running {} scenario(s), {} at a time", entries.len(), parallelism);

        let mut indexed: Vec<(usize, ScenarioResult)> = stream::iter(entries.iter().enumerate())
            .map(|(index, entry)| async move { (index, self.run_scenario(entry).await) })
            .buffer_unordered(parallelism)
            .collect()
            .await;
        indexed.sort_by_key(|(index, _)| *index);

        let results = indexed.into_iter().map(|(_, result)| result).collect();
        let suite = SuiteResult::from_results(results, start.elapsed().as_millis() as u64);

        info!(
            "Scenario results: {} passed, {} failed, {} harness error(s) ({} ms)",
            suite.passed, suite.failed, suite.harness_errors, suite.duration_ms
        );
        suite
    }

    /// Run one scenario in a fresh world. Cleanup runs whatever happened,
    /// including a panicking step.
    pub async fn run_scenario(&self, entry: &CatalogEntry) -> ScenarioResult {
        let start = Instant::now();
        let scenario = &entry.scenario;
        debug!(feature = %entry.feature, "Running scenario: {}", scenario.name);

        let mut world = ScenarioWorld::new();
        let mut steps_run = 0;

        let outcome = AssertUnwindSafe(run_steps(&self.api, &mut world, &scenario.steps, &mut steps_run))
            .catch_unwind()
            .await;

        let (status, error) = match outcome {
            Ok(Ok(())) => (ScenarioStatus::Passed, None),
            Ok(Err(e)) if e.is_authoring() => (ScenarioStatus::HarnessError, Some(e.to_string())),
            Ok(Err(e)) => (ScenarioStatus::Failed, Some(e.to_string())),
            Err(panic) => (
                ScenarioStatus::Failed,
                Some(format!("Step panicked: {}", panic_message(panic.as_ref()))),
            ),
        };

        let cleanup = cleanup(&self.api, &mut world).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match status {
            ScenarioStatus::Passed => info!("✓ {} ({} ms)", scenario.name, duration_ms),
            _ => error!(
                "✗ {} - {}",
                scenario.name,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
        for failure in cleanup.failures() {
            warn!(kind = %failure.kind, id = failure.id, "Scenario '{}' left data behind", scenario.name);
        }

        ScenarioResult {
            feature: entry.feature.clone(),
            name: scenario.name.clone(),
            status,
            duration_ms,
            steps_run,
            error,
            cleanup,
        }
    }

    /// Write suite results to JSON file
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        write_results(&self.config.output_dir, results)
    }

    /// Write the environment description next to the results
    pub fn write_environment(&self) -> E2eResult<PathBuf> {
        write_environment(&self.config.output_dir, &self.config)
    }
}

async fn run_steps(
    api: &Bookstore,
    world: &mut ScenarioWorld,
    steps: &[ScenarioStep],
    steps_run: &mut usize,
) -> E2eResult<()> {
    for step in steps {
        *steps_run += 1;
        steps::execute(api, world, step).await?;
    }
    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Write `results` as pretty JSON to `dir/scenario-results.json`
pub fn write_results(dir: &Path, results: &SuiteResult) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(RESULTS_FILE);
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

/// Sorted `key=value` lines describing the run
pub fn environment_properties(config: &HarnessConfig) -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("base.url", config.base_url.clone()),
        ("harness.version", bookstore_common::VERSION.to_string()),
        ("parallelism", config.parallelism.to_string()),
        (
            "run.timestamp",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ),
    ])
}

pub fn write_environment(dir: &Path, config: &HarnessConfig) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(ENVIRONMENT_FILE);
    let content: String = environment_properties(config)
        .into_iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect();
    std::fs::write(&path, content)?;

    debug!("Environment written to: {}", path.display());
    Ok(path)
}
