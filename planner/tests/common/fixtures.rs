//! Test fixtures and data for planner tests
//!
//! This module provides consistent test data and fixtures used across all test suites.

use std::time::Duration;

use planner::{DebounceTiming, EngineSettings};
use shared::{
    GroupId, GuestKey, OptimizeResponse, SeatAssignment, SolveOptions, SolverStats, SolverStatus,
    TableAssignment, TableId,
};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const PERSIST_MS: u64 = 300;
    pub const OPTIMIZE_MS: u64 = 500;

    /// Engine settings with the production debounce windows
    pub fn settings() -> EngineSettings {
        EngineSettings {
            timing: DebounceTiming {
                persist: Duration::from_millis(Self::PERSIST_MS),
                optimize: Duration::from_millis(Self::OPTIMIZE_MS),
            },
            solve_options: SolveOptions {
                time_limit_seconds: Some(5.0),
                num_workers: Some(1),
                allow_empty_seats: Some(true),
            },
        }
    }

    fn row(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Two groups: a couple and a single guest
    pub fn couple_and_single() -> Vec<Vec<String>> {
        vec![Self::row(&["Alice", "Bob"]), Self::row(&["Carol"])]
    }

    /// Guest list with blank cells and blank rows mixed in
    pub fn messy_rows() -> Vec<Vec<String>> {
        vec![
            Self::row(&["  Alice ", "", "Bob"]),
            Self::row(&["", "   "]),
            Self::row(&["Carol", "Dave", "Erin"]),
            Vec::new(),
            Self::row(&["Frank"]),
        ]
    }

    /// Four groups of sizes 4, 3, 2 and 1
    pub fn four_groups() -> Vec<Vec<String>> {
        vec![
            Self::row(&["A1", "A2", "A3", "A4"]),
            Self::row(&["B1", "B2", "B3"]),
            Self::row(&["C1", "C2"]),
            Self::row(&["D1"]),
        ]
    }

    /// Solver response seating each group's guests at the given table
    pub fn solved(status: SolverStatus, placements: &[(GroupId, usize, TableId)]) -> OptimizeResponse {
        let tables = placements
            .iter()
            .map(|(group, size, table)| TableAssignment {
                table_id: table.to_string(),
                seats: (0..*size)
                    .map(|i| SeatAssignment {
                        seat_index: i as u32,
                        guest_id: Some(GuestKey::new(*group, i).to_string()),
                        guest_name: None,
                    })
                    .collect(),
            })
            .collect();

        OptimizeResponse {
            status,
            objective_value: Some(0.0),
            tables,
            solver_stats: SolverStats::default(),
        }
    }

    pub fn infeasible() -> OptimizeResponse {
        OptimizeResponse {
            status: SolverStatus::Infeasible,
            objective_value: None,
            tables: Vec::new(),
            solver_stats: SolverStats::default(),
        }
    }
}
