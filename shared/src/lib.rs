//! Shared types for the seating planner
//!
//! Contains the identifiers, domain entities and wire formats used by every
//! planner component: the persisted snapshot and the solver protocol.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod models;
pub mod types;

pub use errors::*;
pub use models::*;
pub use types::*;

pub use messages::{
    // Planner <-> solver service
    AffinityEdge, GroupRecord, GuestRecord, HealthResponse, OptimizeRequest, OptimizeResponse,
    SeatAssignment, SolveOptions, SolverStats, SolverStatus, TableAssignment, TableRecord,

    // Durable state
    PlannerSnapshot,
};
