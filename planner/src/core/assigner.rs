//! Local heuristic assigner
//!
//! First-fit bin packing used before (or instead of) the external solver.
//! Unassigned groups are visited in random order; each goes to the first
//! table, scanning from a rotating start index, that still has room for the
//! whole group. Groups are never split and placement is not optimal.

use std::collections::HashMap;

use shared::{GroupId, TableId};

use super::state::PlannerState;
use crate::traits::RandomSource;

/// Where the heuristic put each group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentReport {
    /// Groups that found a table, in placement order
    pub placed: Vec<(GroupId, TableId)>,
    /// Groups left unassigned because no table had room
    pub unplaced: Vec<GroupId>,
}

impl AssignmentReport {
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty() && self.unplaced.is_empty()
    }
}

/// In-place Fisher–Yates shuffle driven by `rng`
pub fn shuffle<T, R>(items: &mut [T], rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1).min(i);
        items.swap(i, j);
    }
}

impl PlannerState {
    /// Seat every unassigned group that fits somewhere
    pub fn assign_unassigned<R>(&mut self, rng: &mut R) -> AssignmentReport
    where
        R: RandomSource + ?Sized,
    {
        let mut report = AssignmentReport::default();

        let mut pending: Vec<(GroupId, usize)> = self
            .groups
            .iter()
            .filter(|g| !g.is_assigned())
            .map(|g| (g.id, g.size()))
            .collect();
        if pending.is_empty() || self.tables.is_empty() {
            return report;
        }

        shuffle(&mut pending, rng);

        let mut occupied: HashMap<TableId, usize> = self
            .tables
            .iter()
            .map(|t| (t.id, self.occupied_seats(t.id)))
            .collect();
        let table_count = self.tables.len();
        let mut table_index = 0;

        for (group_id, size) in pending {
            let found = (0..table_count)
                .map(|offset| (table_index + offset) % table_count)
                .find(|&i| {
                    let table = &self.tables[i];
                    occupied[&table.id] + size <= table.seat_count as usize
                });

            match found {
                Some(i) => {
                    let table_id = self.tables[i].id;
                    if let Some(seats) = occupied.get_mut(&table_id) {
                        *seats += size;
                    }
                    if let Some(group) = self.group_mut(group_id) {
                        group.table_id = Some(table_id);
                    }
                    report.placed.push((group_id, table_id));
                    table_index = (i + 1) % table_count;
                }
                None => report.unplaced.push(group_id),
            }
        }

        report
    }
}
