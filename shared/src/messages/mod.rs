//! Message types crossing the planner's process boundaries
//!
//! - `solver`: planner ↔ external constraint solver (`/v1/optimize`, `/health`)
//! - `snapshot`: durable planner state written to the snapshot store

pub mod snapshot;
pub mod solver;

pub use snapshot::PlannerSnapshot;

pub use solver::{
    AffinityEdge, GroupRecord, GuestRecord, HealthResponse, OptimizeRequest, OptimizeResponse,
    SeatAssignment, SolveOptions, SolverStats, SolverStatus, TableAssignment, TableRecord,
};
