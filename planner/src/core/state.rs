//! Planner state management
//!
//! The aggregate root holding tables, groups, constraints and seat orders,
//! plus the transient selection and orchestration fields. Pure state with no
//! I/O so every invariant can be tested directly.

use std::collections::{HashMap, HashSet};

use shared::logging::Component;
use shared::{
    planner_warn, CanvasSettings, Constraint, GroupId, GuestGroup, GuestKey, PlannerSnapshot,
    SolverStatus, Table, TableId,
};

use super::warnings::SeatingWarning;

/// Footprint of one table on the canvas, in pixels
pub const TABLE_FOOTPRINT: f64 = 120.0;
/// Gap between neighbouring tables in a generated grid
pub const TABLE_MARGIN: f64 = 60.0;
/// Upper bound for one `add_multiple_tables` call
pub const MAX_TABLES_PER_BATCH: i64 = 20;

/// Where the optimization pipeline currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationPhase {
    #[default]
    Idle,
    /// A trigger is armed and waiting for its quiet period
    Debouncing,
    /// A solver request is outstanding
    Calling,
    /// A solved response is being written into the state
    Applying,
}

/// Result of one optimization attempt
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizationOutcome {
    /// The solver found a seating and it was applied
    Applied { status: SolverStatus, assigned_groups: usize },
    /// No seating satisfies the constraints; nothing changed
    Infeasible,
    /// Transport error, rejected request or unusable status; nothing changed
    Failed { reason: String },
    /// A newer request was issued while this one was in flight
    Superseded,
    /// Nothing to optimize (no tables or no groups)
    Skipped,
}

impl OptimizationOutcome {
    /// Outcomes worth remembering as the last optimization status
    pub fn is_recorded(&self) -> bool {
        !matches!(self, OptimizationOutcome::Superseded | OptimizationOutcome::Skipped)
    }
}

/// Core planner state
#[derive(Debug, Clone, Default)]
pub struct PlannerState {
    pub(crate) tables: Vec<Table>,
    pub(crate) groups: Vec<GuestGroup>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) seat_orders: HashMap<TableId, Vec<GuestKey>>,
    pub(crate) canvas_settings: CanvasSettings,

    // Transient, never persisted
    pub(crate) selected_table_id: Option<TableId>,
    pub(crate) highlighted_group_id: Option<GroupId>,
    pub(crate) phase: OptimizationPhase,
    pub(crate) is_optimizing: bool,
    pub(crate) last_optimization: Option<OptimizationOutcome>,
}

impl PlannerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state from a persisted snapshot, repairing anything that would
    /// break an invariant. Selection state always starts empty.
    pub fn from_snapshot(snapshot: PlannerSnapshot) -> Self {
        let PlannerSnapshot {
            mut tables,
            mut groups,
            constraints,
            canvas_settings,
            mut seat_orders,
            ..
        } = snapshot;

        for table in &mut tables {
            let clamped = Table::clamp_seat_count(table.seat_count as i64);
            if clamped != table.seat_count {
                planner_warn!(Component::Store, "⚠️ Table {} had {} seats, clamped to {}", table.id, table.seat_count, clamped);
                table.seat_count = clamped;
            }
        }

        for group in &mut groups {
            if let Some(table_id) = group.table_id {
                if !tables.iter().any(|t| t.id == table_id) {
                    planner_warn!(Component::Store, "⚠️ Group {} referenced missing table {}, unassigned", group.id, table_id);
                    group.table_id = None;
                }
            }
        }

        let mut same_table_groups: HashSet<GroupId> = HashSet::new();
        let mut preference_pairs: HashSet<(GroupId, GroupId)> = HashSet::new();
        let constraints: Vec<Constraint> = constraints
            .into_iter()
            .filter(|c| {
                let problem = if !c.is_well_formed()
                    || !c.group_ids.iter().all(|id| groups.iter().any(|g| g.id == *id))
                {
                    Some("malformed")
                } else {
                    match *c.group_ids.as_slice() {
                        [group] => (!same_table_groups.insert(group)).then_some("repeated SAME_TABLE"),
                        [a, b] if a == b => Some("self preference"),
                        [a, b] => (!preference_pairs.insert((a.min(b), a.max(b))))
                            .then_some("second preference for the same pair"),
                        _ => Some("malformed"),
                    }
                };
                if let Some(problem) = problem {
                    planner_warn!(Component::Store, "⚠️ Dropping constraint {} ({})", c.id, problem);
                }
                problem.is_none()
            })
            .collect();

        seat_orders.retain(|table_id, order| {
            tables.iter().any(|t| t.id == *table_id) && !order.is_empty()
        });

        Self {
            tables,
            groups,
            constraints,
            seat_orders,
            canvas_settings,
            ..Self::default()
        }
    }

    /// Persistable view of the state. Transient fields are left out.
    pub fn snapshot(&self) -> PlannerSnapshot {
        PlannerSnapshot {
            tables: self.tables.clone(),
            groups: self.groups.clone(),
            constraints: self.constraints.clone(),
            canvas_settings: self.canvas_settings.clone(),
            seat_orders: self.seat_orders.clone(),
            selected_table_id: None,
            highlighted_group_id: None,
        }
    }

    // Accessors

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn groups(&self) -> &[GuestGroup] {
        &self.groups
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn seat_orders(&self) -> &HashMap<TableId, Vec<GuestKey>> {
        &self.seat_orders
    }

    pub fn canvas_settings(&self) -> &CanvasSettings {
        &self.canvas_settings
    }

    pub fn selected_table_id(&self) -> Option<TableId> {
        self.selected_table_id
    }

    pub fn highlighted_group_id(&self) -> Option<GroupId> {
        self.highlighted_group_id
    }

    pub fn phase(&self) -> OptimizationPhase {
        self.phase
    }

    pub fn is_optimizing(&self) -> bool {
        self.is_optimizing
    }

    pub fn last_optimization(&self) -> Option<&OptimizationOutcome> {
        self.last_optimization.as_ref()
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&GuestGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> Option<&mut GuestGroup> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Groups currently seated at `table`, in group order
    pub fn groups_at(&self, table: TableId) -> impl Iterator<Item = &GuestGroup> {
        self.groups.iter().filter(move |g| g.table_id == Some(table))
    }

    /// Seats taken at `table` by assigned groups
    pub fn occupied_seats(&self, table: TableId) -> usize {
        self.groups_at(table).map(GuestGroup::size).sum()
    }

    pub fn total_capacity(&self) -> usize {
        self.tables.iter().map(|t| t.seat_count as usize).sum()
    }

    pub fn total_guests(&self) -> usize {
        self.groups.iter().map(GuestGroup::size).sum()
    }

    /// Every guest could in principle be seated
    pub fn has_sufficient_capacity(&self) -> bool {
        self.total_capacity() >= self.total_guests()
    }

    // Table mutators

    /// Append a table with the default seat count
    pub fn add_table(&mut self, x: f64, y: f64) -> TableId {
        let table = Table::new(x, y, Table::DEFAULT_SEATS as i64);
        let id = table.id;
        self.tables.push(table);
        id
    }

    /// Append up to `MAX_TABLES_PER_BATCH` tables laid out in a centred grid
    pub fn add_multiple_tables(&mut self, count: i64, seats_per_table: i64) -> Vec<TableId> {
        let count = count.clamp(1, MAX_TABLES_PER_BATCH) as usize;
        let cols = (count as f64).sqrt().ceil() as usize;
        let rows = count.div_ceil(cols);
        let cell = TABLE_FOOTPRINT + TABLE_MARGIN;

        let origin_x = (self.canvas_settings.width - cols as f64 * cell) / 2.0 + cell / 2.0;
        let origin_y = (self.canvas_settings.height - rows as f64 * cell) / 2.0 + cell / 2.0;

        (0..count)
            .map(|i| {
                let x = origin_x + (i % cols) as f64 * cell;
                let y = origin_y + (i / cols) as f64 * cell;
                let table = Table::new(x, y, seats_per_table);
                let id = table.id;
                self.tables.push(table);
                id
            })
            .collect()
    }

    pub fn update_table_position(&mut self, id: TableId, x: f64, y: f64) -> Result<(), SeatingWarning> {
        let table = self
            .tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(SeatingWarning::UnknownTable { table: id })?;
        table.x = x;
        table.y = y;
        Ok(())
    }

    /// Set a table's seat count, clamped to the supported range. Returns the
    /// stored value.
    pub fn update_table_seat_count(&mut self, id: TableId, seats: i64) -> Result<u32, SeatingWarning> {
        let table = self
            .tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(SeatingWarning::UnknownTable { table: id })?;
        table.seat_count = Table::clamp_seat_count(seats);
        Ok(table.seat_count)
    }

    /// Delete a table, unassigning every group seated there. Returns the
    /// groups that lost their seat.
    pub fn remove_table(&mut self, id: TableId) -> Result<Vec<GroupId>, SeatingWarning> {
        let index = self
            .tables
            .iter()
            .position(|t| t.id == id)
            .ok_or(SeatingWarning::UnknownTable { table: id })?;

        let mut unassigned = Vec::new();
        for group in self.groups.iter_mut().filter(|g| g.table_id == Some(id)) {
            group.table_id = None;
            unassigned.push(group.id);
        }

        self.tables.remove(index);
        self.seat_orders.remove(&id);
        if self.selected_table_id == Some(id) {
            self.selected_table_id = None;
        }
        Ok(unassigned)
    }

    // Group mutators

    /// Seat a whole group at `table` if it fits
    pub fn assign_group_to_table(&mut self, group_id: GroupId, table_id: TableId) -> Result<(), SeatingWarning> {
        let table = self
            .table(table_id)
            .ok_or(SeatingWarning::UnknownTable { table: table_id })?;
        let group = self
            .group(group_id)
            .ok_or(SeatingWarning::UnknownGroup { group: group_id })?;

        if group.table_id == Some(table_id) {
            return Ok(());
        }

        let available = (table.seat_count as usize).saturating_sub(self.occupied_seats(table_id));
        if group.size() > available {
            return Err(SeatingWarning::InsufficientCapacity {
                group: group_id,
                table: table_id,
                needed: group.size(),
                available,
            });
        }

        if let Some(group) = self.group_mut(group_id) {
            group.table_id = Some(table_id);
        }
        Ok(())
    }

    /// Clear a group's table. Returns whether it was seated before.
    pub fn unassign_group(&mut self, group_id: GroupId) -> Result<bool, SeatingWarning> {
        let group = self
            .group_mut(group_id)
            .ok_or(SeatingWarning::UnknownGroup { group: group_id })?;
        Ok(group.table_id.take().is_some())
    }

    // Transient UI state

    pub fn select_table(&mut self, table: Option<TableId>) -> Result<(), SeatingWarning> {
        if let Some(id) = table {
            if self.table(id).is_none() {
                return Err(SeatingWarning::UnknownTable { table: id });
            }
        }
        self.selected_table_id = table;
        Ok(())
    }

    pub fn highlight_group(&mut self, group: Option<GroupId>) -> Result<(), SeatingWarning> {
        if let Some(id) = group {
            if self.group(id).is_none() {
                return Err(SeatingWarning::UnknownGroup { group: id });
            }
        }
        self.highlighted_group_id = group;
        Ok(())
    }

    pub fn set_canvas_settings(&mut self, settings: CanvasSettings) {
        self.canvas_settings = settings;
    }

    // Orchestration bookkeeping

    pub(crate) fn set_phase(&mut self, phase: OptimizationPhase) {
        self.phase = phase;
    }

    pub(crate) fn set_optimizing(&mut self, optimizing: bool) {
        self.is_optimizing = optimizing;
    }

    pub(crate) fn record_optimization(&mut self, outcome: OptimizationOutcome) {
        if outcome.is_recorded() {
            self.last_optimization = Some(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ConstraintType;

    fn group(names: &[&str]) -> GuestGroup {
        GuestGroup::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_add_table_uses_default_seat_count() {
        let mut state = PlannerState::new();
        let id = state.add_table(15.0, 25.0);

        let table = state.table(id).unwrap();
        assert_eq!(table.seat_count, 8);
        assert_eq!((table.x, table.y), (15.0, 25.0));
    }

    #[test]
    fn test_add_multiple_tables_clamps_count() {
        let mut state = PlannerState::new();
        let ids = state.add_multiple_tables(25, 8);
        assert_eq!(ids.len(), 20);
        assert!(state.tables().iter().all(|t| t.seat_count == 8));

        let positions: HashSet<(u64, u64)> = state
            .tables()
            .iter()
            .map(|t| (t.x.to_bits(), t.y.to_bits()))
            .collect();
        assert_eq!(positions.len(), 20);

        let mut small = PlannerState::new();
        assert_eq!(small.add_multiple_tables(-5, 8).len(), 1);
        assert_eq!(small.add_multiple_tables(3, 99).len(), 3);
        assert!(small.tables()[1..].iter().all(|t| t.seat_count == 20));
    }

    #[test]
    fn test_add_multiple_tables_grid_is_centred() {
        let mut state = PlannerState::new();
        state.add_multiple_tables(4, 6);

        let canvas = state.canvas_settings().clone();
        let xs: Vec<f64> = state.tables().iter().map(|t| t.x).collect();
        let ys: Vec<f64> = state.tables().iter().map(|t| t.y).collect();

        // 2x2 grid, symmetric around the canvas centre
        let mean_x = xs.iter().sum::<f64>() / 4.0;
        let mean_y = ys.iter().sum::<f64>() / 4.0;
        assert!((mean_x - canvas.width / 2.0).abs() < 1e-9);
        assert!((mean_y - canvas.height / 2.0).abs() < 1e-9);
        assert_eq!(xs[1] - xs[0], TABLE_FOOTPRINT + TABLE_MARGIN);
        assert_eq!(ys[2] - ys[0], TABLE_FOOTPRINT + TABLE_MARGIN);
    }

    #[test]
    fn test_seat_count_update_is_clamped() {
        let mut state = PlannerState::new();
        let id = state.add_table(0.0, 0.0);

        assert_eq!(state.update_table_seat_count(id, 1), Ok(2));
        assert_eq!(state.update_table_seat_count(id, 21), Ok(20));
        assert_eq!(state.update_table_seat_count(id, 10), Ok(10));

        let missing = TableId::new();
        assert_eq!(
            state.update_table_seat_count(missing, 10),
            Err(SeatingWarning::UnknownTable { table: missing })
        );
    }

    #[test]
    fn test_remove_table_cascades() {
        let mut state = PlannerState::new();
        let keep = state.add_table(0.0, 0.0);
        let doomed = state.add_table(100.0, 0.0);

        let g1 = group(&["Alice", "Bob"]);
        let g2 = group(&["Carol"]);
        let (g1_id, g2_id) = (g1.id, g2.id);
        state.groups = vec![g1, g2];
        state.assign_group_to_table(g1_id, doomed).unwrap();
        state.assign_group_to_table(g2_id, keep).unwrap();
        state.seat_orders.insert(doomed, vec![GuestKey::new(g1_id, 0)]);
        state.select_table(Some(doomed)).unwrap();

        let unassigned = state.remove_table(doomed).unwrap();

        assert_eq!(unassigned, vec![g1_id]);
        assert_eq!(state.group(g1_id).unwrap().table_id, None);
        assert_eq!(state.group(g2_id).unwrap().table_id, Some(keep));
        assert!(state.seat_orders().get(&doomed).is_none());
        assert_eq!(state.selected_table_id(), None);
        assert_eq!(state.tables().len(), 1);
    }

    #[test]
    fn test_assign_group_rejects_overflow() {
        let mut state = PlannerState::new();
        let table = state.add_table(0.0, 0.0);
        state.update_table_seat_count(table, 3).unwrap();

        let pair = group(&["A", "B"]);
        let trio = group(&["C", "D", "E"]);
        let (pair_id, trio_id) = (pair.id, trio.id);
        state.groups = vec![pair, trio];

        state.assign_group_to_table(pair_id, table).unwrap();
        let err = state.assign_group_to_table(trio_id, table).unwrap_err();
        assert_eq!(
            err,
            SeatingWarning::InsufficientCapacity { group: trio_id, table, needed: 3, available: 1 }
        );
        assert_eq!(state.group(trio_id).unwrap().table_id, None);

        // Re-assigning to the same table is not double counted
        assert!(state.assign_group_to_table(pair_id, table).is_ok());
        assert_eq!(state.unassign_group(pair_id), Ok(true));
        assert_eq!(state.unassign_group(pair_id), Ok(false));
    }

    #[test]
    fn test_capacity_totals() {
        let mut state = PlannerState::new();
        state.groups = vec![group(&["A", "B", "C"])];
        assert!(!state.has_sufficient_capacity());

        let table = state.add_table(0.0, 0.0);
        state.update_table_seat_count(table, 2).unwrap();
        assert_eq!(state.total_capacity(), 2);
        assert_eq!(state.total_guests(), 3);
        assert!(!state.has_sufficient_capacity());

        state.update_table_seat_count(table, 3).unwrap();
        assert!(state.has_sufficient_capacity());
    }

    #[test]
    fn test_snapshot_excludes_transient_state() {
        let mut state = PlannerState::new();
        let table = state.add_table(1.0, 2.0);
        let g = group(&["Alice"]);
        let g_id = g.id;
        state.groups.push(g);
        state.select_table(Some(table)).unwrap();
        state.highlight_group(Some(g_id)).unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.selected_table_id, None);
        assert_eq!(snapshot.highlighted_group_id, None);

        let restored = PlannerState::from_snapshot(snapshot.clone());
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.selected_table_id(), None);
        assert_eq!(restored.highlighted_group_id(), None);
    }

    #[test]
    fn test_from_snapshot_repairs_invariants() {
        let table = Table::new(0.0, 0.0, 8);
        let mut seated = group(&["Alice"]);
        seated.table_id = Some(TableId::new());
        let orphan_constraint = Constraint::same_table(GroupId::new());
        let mut malformed = Constraint::same_table(seated.id);
        malformed.group_ids.push(GroupId::new());

        let other = group(&["Bob"]);
        let like = Constraint::preference(ConstraintType::Nearby, seated.id, other.id).unwrap();
        let clashing = Constraint::preference(ConstraintType::DifferentTables, other.id, seated.id).unwrap();
        let repeated = Constraint::preference(ConstraintType::Nearby, seated.id, other.id).unwrap();
        let selfish = Constraint::preference(ConstraintType::Nearby, other.id, other.id).unwrap();

        let mut snapshot = PlannerSnapshot {
            tables: vec![table.clone()],
            groups: vec![seated.clone(), other.clone()],
            constraints: vec![
                Constraint::same_table(seated.id),
                orphan_constraint,
                malformed,
                Constraint::same_table(seated.id),
                Constraint::same_table(other.id),
                like.clone(),
                clashing,
                repeated,
                selfish,
            ],
            ..Default::default()
        };
        snapshot.tables[0].seat_count = 50;
        snapshot.seat_orders.insert(TableId::new(), vec![GuestKey::new(seated.id, 0)]);

        let state = PlannerState::from_snapshot(snapshot);
        assert_eq!(state.tables()[0].seat_count, 20);
        assert_eq!(state.group(seated.id).unwrap().table_id, None);
        assert!(state.seat_orders().is_empty());

        let same_table: Vec<GroupId> = state
            .constraints()
            .iter()
            .filter(|c| c.constraint_type == ConstraintType::SameTable)
            .map(|c| c.group_ids[0])
            .collect();
        assert_eq!(same_table, vec![seated.id, other.id]);
        let preferences: Vec<&Constraint> = state
            .constraints()
            .iter()
            .filter(|c| c.constraint_type.is_preference())
            .collect();
        assert_eq!(preferences, vec![&like]);

        let request = state.build_optimize_request(&shared::SolveOptions::default());
        assert_eq!(request.affinities.len(), 1);
        assert_eq!(request.affinities[0].score, 1);
    }

    #[test]
    fn test_selection_rejects_unknown_ids() {
        let mut state = PlannerState::new();
        assert!(state.select_table(Some(TableId::new())).is_err());
        assert!(state.highlight_group(Some(GroupId::new())).is_err());
        assert!(state.select_table(None).is_ok());
    }

    #[test]
    fn test_recorded_outcomes() {
        let mut state = PlannerState::new();
        state.record_optimization(OptimizationOutcome::Infeasible);
        state.record_optimization(OptimizationOutcome::Superseded);
        state.record_optimization(OptimizationOutcome::Skipped);
        assert_eq!(state.last_optimization(), Some(&OptimizationOutcome::Infeasible));
    }
}
