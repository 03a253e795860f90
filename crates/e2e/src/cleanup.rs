//! Post-scenario cleanup
//!
//! Runs after every scenario whatever its outcome. Each tracked entity gets
//! exactly one delete attempt, books first. Failures are logged and recorded
//! in the report but never returned, so they cannot mask the scenario's own
//! result or stop the remaining deletes.

use bookstore_common::{Entity, EntityId, EntityKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{Bookstore, EntityApi};
use crate::world::{EntityContext, ScenarioWorld};

/// Result of one delete attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CleanupOutcome {
    Deleted { status: u16 },
    Rejected { status: u16 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupAttempt {
    pub kind: EntityKind,
    pub id: EntityId,
    #[serde(flatten)]
    pub outcome: CleanupOutcome,
}

/// Every delete attempted for one scenario
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub attempts: Vec<CleanupAttempt>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Attempts that did not end in a successful delete
    pub fn failures(&self) -> impl Iterator<Item = &CleanupAttempt> {
        self.attempts
            .iter()
            .filter(|a| !matches!(a.outcome, CleanupOutcome::Deleted { .. }))
    }
}

/// Delete everything the world still tracks. Never fails.
pub async fn cleanup(api: &Bookstore, world: &mut ScenarioWorld) -> CleanupReport {
    let mut report = CleanupReport::default();

    while let Some(attempt) = release(api.books.as_ref(), world.books_mut()).await {
        report.attempts.push(attempt);
    }
    while let Some(attempt) = release(api.authors.as_ref(), world.authors_mut()).await {
        report.attempts.push(attempt);
    }

    report
}

async fn release<E: Entity>(
    api: &dyn EntityApi<E>,
    context: &mut EntityContext<E>,
) -> Option<CleanupAttempt> {
    // cleared before the call: at most one attempt, whatever happens next
    let id = context.take_tracked()?;

    let outcome = match api.delete(id).await {
        Ok(response) if response.is_success() => {
            debug!(kind = %E::KIND, id, "Cleanup deleted entity");
            CleanupOutcome::Deleted { status: response.status() }
        }
        Ok(response) => {
            warn!(
                kind = %E::KIND,
                id,
                status = response.status(),
                "Cleanup delete was rejected"
            );
            CleanupOutcome::Rejected { status: response.status() }
        }
        Err(e) => {
            warn!(kind = %E::KIND, id, error = %e, "Failed to delete entity during cleanup");
            CleanupOutcome::Failed { error: e.to_string() }
        }
    };

    Some(CleanupAttempt {
        kind: E::KIND,
        id,
        outcome,
    })
}
