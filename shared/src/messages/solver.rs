//! Planner ↔ solver service protocol
//!
//! Request and response bodies for `POST /v1/optimize` and `GET /health`.
//! Field names follow the solver's snake_case JSON.

use serde::{Deserialize, Serialize};

use crate::types::{GroupId, GuestKey, TableId};

/// Table capacity record
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TableRecord {
    pub id: TableId,
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One synthetic guest per name of a group
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GuestRecord {
    pub id: GuestKey,
    pub name: String,
}

/// Guests that the solver must keep at one table
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GroupRecord {
    pub id: GroupId,
    pub guest_ids: Vec<GuestKey>,
}

/// Signed preference between two groups
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AffinityEdge {
    pub a: GroupId,
    pub b: GroupId,
    pub score: i32,
}

/// Solver tuning knobs; absent fields fall back to the solver's defaults
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct SolveOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_workers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_empty_seats: Option<bool>,
}

/// Body of `POST /v1/optimize`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OptimizeRequest {
    pub tables: Vec<TableRecord>,
    pub guests: Vec<GuestRecord>,
    pub groups: Vec<GroupRecord>,
    pub affinities: Vec<AffinityEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<SolveOptions>,
}

/// Solver termination status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
    ModelInvalid,
}

impl SolverStatus {
    /// The response carries a usable assignment
    pub fn has_solution(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::Unknown => "UNKNOWN",
            SolverStatus::ModelInvalid => "MODEL_INVALID",
        };
        write!(f, "{name}")
    }
}

/// One seat of a solved table
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SeatAssignment {
    pub seat_index: u32,
    pub guest_id: Option<String>,
    pub guest_name: Option<String>,
}

/// Seats of one table as returned by the solver
///
/// Identifiers stay as raw strings here; the planner validates them against
/// its own state when applying the result.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TableAssignment {
    pub table_id: String,
    pub seats: Vec<SeatAssignment>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct SolverStats {
    #[serde(default)]
    pub conflicts: u64,
    #[serde(default)]
    pub branches: u64,
    #[serde(default)]
    pub wall_time_seconds: f64,
}

/// Body of a successful `POST /v1/optimize`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OptimizeResponse {
    pub status: SolverStatus,
    #[serde(default)]
    pub objective_value: Option<f64>,
    #[serde(default)]
    pub tables: Vec<TableAssignment>,
    #[serde(default)]
    pub solver_stats: SolverStats,
}

/// Body of `GET /health`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
