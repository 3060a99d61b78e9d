//! Solver request builder and response applier

use std::collections::HashMap;

use shared::logging::Component;
use shared::{
    planner_warn, AffinityEdge, GroupRecord, GuestKey, GuestRecord, OptimizeRequest,
    OptimizeResponse, SolveOptions, TableId, TableRecord,
};

use super::state::PlannerState;

/// Counts produced by applying a solver response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedAssignments {
    pub assigned_groups: usize,
    pub unassigned_groups: usize,
    /// Seats whose guest or table id could not be matched
    pub ignored_seats: usize,
}

impl PlannerState {
    /// Build the solver request for the current state
    pub fn build_optimize_request(&self, options: &SolveOptions) -> OptimizeRequest {
        let tables = self
            .tables
            .iter()
            .enumerate()
            .map(|(i, table)| TableRecord {
                id: table.id,
                capacity: table.seat_count,
                label: Some(format!("Table {}", i + 1)),
            })
            .collect();

        let guests = self
            .groups
            .iter()
            .flat_map(|group| {
                group
                    .guest_keys()
                    .zip(group.guest_names())
                    .map(|(id, name)| GuestRecord { id, name: name.clone() })
            })
            .collect();

        let groups = self
            .groups
            .iter()
            .map(|group| GroupRecord {
                id: group.id,
                guest_ids: group.guest_keys().collect(),
            })
            .collect();

        let affinities = self
            .constraints
            .iter()
            .filter_map(|c| match (c.constraint_type.affinity_score(), c.group_ids.as_slice()) {
                (Some(score), [a, b]) => Some(AffinityEdge { a: *a, b: *b, score }),
                _ => None,
            })
            .collect();

        OptimizeRequest {
            tables,
            guests,
            groups,
            affinities,
            options: Some(options.clone()),
        }
    }

    /// Write a solved seating into the groups
    ///
    /// Each group takes the table of its first guest, or none when that guest
    /// was not seated. Applying the same response twice yields the same state.
    pub fn apply_assignments(&mut self, response: &OptimizeResponse) -> AppliedAssignments {
        let mut result = AppliedAssignments::default();
        let mut seat_of: HashMap<GuestKey, TableId> = HashMap::new();

        for assignment in &response.tables {
            let table_id = match assignment.table_id.parse::<TableId>() {
                Ok(id) if self.table(id).is_some() => id,
                _ => {
                    planner_warn!(Component::Solver, "⚠️ Ignoring unknown table '{}' in solver response", assignment.table_id);
                    result.ignored_seats += assignment.seats.iter().filter(|s| s.guest_id.is_some()).count();
                    continue;
                }
            };

            for guest_id in assignment.seats.iter().filter_map(|s| s.guest_id.as_deref()) {
                match guest_id.parse::<GuestKey>() {
                    Ok(key) => {
                        seat_of.insert(key, table_id);
                    }
                    Err(_) => {
                        planner_warn!(Component::Solver, "⚠️ Ignoring unparseable guest id '{}'", guest_id);
                        result.ignored_seats += 1;
                    }
                }
            }
        }

        for group in &mut self.groups {
            group.table_id = seat_of.get(&GuestKey::first_of(group.id)).copied();
            if group.table_id.is_some() {
                result.assigned_groups += 1;
            } else {
                result.unassigned_groups += 1;
            }
        }

        result
    }
}
