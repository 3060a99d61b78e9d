//! Trait definitions with mockall annotations for testing
//!
//! Every collaborator the engine talks to sits behind one of these traits so
//! the planner can be driven without a network, a disk or real randomness.

use shared::{HealthResponse, OptimizeRequest, OptimizeResponse, PlannerSnapshot};

use crate::error::PlannerResult;

/// External constraint solver
#[mockall::automock]
#[async_trait::async_trait]
pub trait SolverClient: Send + Sync {
    /// Submit a seating problem and wait for the solver's answer
    ///
    /// # Returns
    /// The parsed response for any 2xx reply, whatever its `status`. Transport
    /// failures, non-2xx replies and unparseable bodies are errors.
    async fn optimize(&self, request: &OptimizeRequest) -> PlannerResult<OptimizeResponse>;

    /// Query the solver's health endpoint
    async fn health_check(&self) -> PlannerResult<HealthResponse>;
}

/// Durable key-value storage for planner snapshots
#[mockall::automock]
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot, `None` when nothing was saved yet
    async fn load(&self) -> PlannerResult<Option<PlannerSnapshot>>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &PlannerSnapshot) -> PlannerResult<()>;
}

/// Producer of already-split guest list rows
///
/// Each row is one group; cells are raw, untrimmed strings.
#[mockall::automock]
#[async_trait::async_trait]
pub trait RowSource: Send + Sync {
    async fn read_rows(&self) -> PlannerResult<Vec<Vec<String>>>;
}

/// Source of randomness for the local assigner
#[mockall::automock]
pub trait RandomSource: Send {
    /// Uniform index in `0..upper`; `upper` is always at least 1
    fn next_index(&mut self, upper: usize) -> usize;
}
