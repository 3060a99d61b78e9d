//! Seating planner library
//!
//! This library keeps a persisted, continuously reconciled assignment of guest
//! groups to tables. It owns the domain model, a local first-fit assigner and
//! the integration with an external constraint solver, with every outside
//! collaborator injected through the traits in [`traits`].

pub mod config;
pub mod core;
pub mod debounce;
pub mod error;
pub mod planner;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{DebounceTiming, EngineSettings, PlannerConfig};
pub use self::core::{
    AssignmentReport, ImportSummary, ImportedGuests, OptimizationOutcome, OptimizationPhase,
    PlannerState, SeatingWarning,
};
pub use error::{PlannerError, PlannerResult};
pub use self::planner::Planner;
pub use traits::{
    MockRandomSource, MockRowSource, MockSnapshotStore, MockSolverClient, RandomSource, RowSource,
    SnapshotStore, SolverClient,
};
