//! Main planner implementation
//!
//! The `Planner` owns the seating state and the injected services. Every
//! operation is a short critical section on the state; solver calls and
//! snapshot writes happen with the lock released. Persistence and
//! optimization are debounced independently, and each optimize request
//! carries a generation number so that a response older than the latest
//! request is dropped instead of overwriting newer results.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use shared::logging::Component;
use shared::{
    planner_debug, planner_error, planner_info, planner_warn, CanvasSettings, Constraint,
    ConstraintId, GroupId, GuestKey, HealthResponse, PlannerSnapshot, Preference, SolverStatus,
    TableId,
};

use crate::config::EngineSettings;
use crate::core::{
    AssignmentReport, ImportSummary, ImportedGuests, OptimizationOutcome, OptimizationPhase,
    PlannerState, SeatingWarning,
};
use crate::debounce::Debouncer;
use crate::error::{PlannerError, PlannerResult};
use crate::traits::{RandomSource, RowSource, SnapshotStore, SolverClient};

struct PlannerInner<C, S, R> {
    state: Mutex<PlannerState>,

    /// Injected services
    solver: C,
    store: S,
    random: Mutex<R>,

    settings: EngineSettings,
    persist_timer: Debouncer,
    optimize_timer: Debouncer,

    /// Generation of the most recently issued optimize request
    latest_generation: AtomicU64,
    /// Optimize requests awaiting a response
    in_flight: AtomicUsize,
}

/// Seating planner engine
pub struct Planner<C, S, R>
where
    C: SolverClient + 'static,
    S: SnapshotStore + 'static,
    R: RandomSource + 'static,
{
    inner: Arc<PlannerInner<C, S, R>>,
}

impl<C, S, R> Clone for Planner<C, S, R>
where
    C: SolverClient + 'static,
    S: SnapshotStore + 'static,
    R: RandomSource + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Log a rejected request and hand it back unchanged
fn noted<T>(result: Result<T, SeatingWarning>) -> Result<T, SeatingWarning> {
    if let Err(warning) = &result {
        planner_warn!(Component::Engine, "⚠️ {}", warning);
    }
    result
}

impl<C, S, R> Planner<C, S, R>
where
    C: SolverClient + 'static,
    S: SnapshotStore + 'static,
    R: RandomSource + 'static,
{
    /// Create a planner with empty state and injected dependencies
    pub fn new(solver: C, store: S, random: R, settings: EngineSettings) -> Self {
        Self::with_state(PlannerState::new(), solver, store, random, settings)
    }

    pub fn with_state(state: PlannerState, solver: C, store: S, random: R, settings: EngineSettings) -> Self {
        Self {
            inner: Arc::new(PlannerInner {
                state: Mutex::new(state),
                solver,
                store,
                random: Mutex::new(random),
                settings,
                persist_timer: Debouncer::new(),
                optimize_timer: Debouncer::new(),
                latest_generation: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Replace the state with the stored snapshot, if there is one
    ///
    /// # Returns
    /// Whether a snapshot was found.
    pub async fn load(&self) -> PlannerResult<bool> {
        let Some(snapshot) = self.inner.store.load().await? else {
            planner_debug!(Component::Store, "📭 No saved snapshot, starting empty");
            return Ok(false);
        };

        let mut state = self.inner.state.lock().await;
        *state = PlannerState::from_snapshot(snapshot);
        planner_info!(
            Component::Store,
            "📂 Restored {} tables, {} groups and {} constraints",
            state.tables().len(),
            state.groups().len(),
            state.constraints().len()
        );
        Ok(true)
    }

    /// Run a read-only closure against the current state
    pub async fn read<T>(&self, f: impl FnOnce(&PlannerState) -> T) -> T {
        let state = self.inner.state.lock().await;
        f(&state)
    }

    pub async fn snapshot(&self) -> PlannerSnapshot {
        self.read(PlannerState::snapshot).await
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    // Tables

    pub async fn add_table(&self, x: f64, y: f64) -> TableId {
        let (id, capacity_ok) = {
            let mut state = self.inner.state.lock().await;
            let id = state.add_table(x, y);
            (id, state.has_sufficient_capacity())
        };
        planner_debug!(Component::Engine, "🪑 Added table {}", id);
        self.after_capacity_change(capacity_ok).await;
        id
    }

    pub async fn add_multiple_tables(&self, count: i64, seats_per_table: i64) -> Vec<TableId> {
        let (ids, capacity_ok) = {
            let mut state = self.inner.state.lock().await;
            let ids = state.add_multiple_tables(count, seats_per_table);
            (ids, state.has_sufficient_capacity())
        };
        planner_info!(Component::Engine, "🪑 Added {} tables", ids.len());
        self.after_capacity_change(capacity_ok).await;
        ids
    }

    pub async fn update_table_position(&self, id: TableId, x: f64, y: f64) -> Result<(), SeatingWarning> {
        noted(self.inner.state.lock().await.update_table_position(id, x, y))?;
        self.schedule_persist();
        Ok(())
    }

    pub async fn update_table_seat_count(&self, id: TableId, seats: i64) -> Result<u32, SeatingWarning> {
        let (stored, capacity_ok) = {
            let mut state = self.inner.state.lock().await;
            let stored = noted(state.update_table_seat_count(id, seats))?;
            (stored, state.has_sufficient_capacity())
        };
        self.after_capacity_change(capacity_ok).await;
        Ok(stored)
    }

    /// Delete a table. Groups seated there become unassigned.
    pub async fn remove_table(&self, id: TableId) -> Result<Vec<GroupId>, SeatingWarning> {
        let (unassigned, capacity_ok) = {
            let mut state = self.inner.state.lock().await;
            let unassigned = noted(state.remove_table(id))?;
            (unassigned, state.has_sufficient_capacity())
        };
        planner_debug!(Component::Engine, "🗑️ Removed table {}, {} groups unassigned", id, unassigned.len());
        self.after_capacity_change(capacity_ok).await;
        Ok(unassigned)
    }

    // Groups

    pub async fn assign_group_to_table(&self, group: GroupId, table: TableId) -> Result<(), SeatingWarning> {
        noted(self.inner.state.lock().await.assign_group_to_table(group, table))?;
        self.schedule_persist();
        Ok(())
    }

    pub async fn unassign_group(&self, group: GroupId) -> Result<bool, SeatingWarning> {
        let was_seated = noted(self.inner.state.lock().await.unassign_group(group))?;
        if was_seated {
            self.schedule_persist();
        }
        Ok(was_seated)
    }

    pub async fn select_table(&self, table: Option<TableId>) -> Result<(), SeatingWarning> {
        noted(self.inner.state.lock().await.select_table(table))
    }

    pub async fn highlight_group(&self, group: Option<GroupId>) -> Result<(), SeatingWarning> {
        noted(self.inner.state.lock().await.highlight_group(group))
    }

    pub async fn set_canvas_settings(&self, settings: CanvasSettings) {
        self.inner.state.lock().await.set_canvas_settings(settings);
        self.schedule_persist();
    }

    // Import

    /// Replace the domain with the guest list read from `source`
    ///
    /// A failing source leaves the state untouched.
    pub async fn import_guests<Src>(&self, source: &Src) -> PlannerResult<ImportSummary>
    where
        Src: RowSource + ?Sized,
    {
        let rows = source.read_rows().await.map_err(|e| {
            planner_error!(Component::Importer, "❌ Guest list could not be read: {}", e);
            match e {
                PlannerError::ImportError { .. } => e,
                other => PlannerError::import(other.to_string()),
            }
        })?;
        Ok(self.import_rows(&rows).await)
    }

    pub async fn import_rows(&self, rows: &[Vec<String>]) -> ImportSummary {
        let imported = ImportedGuests::from_rows(rows);

        let (summary, capacity_ok) = {
            let mut state = self.inner.state.lock().await;
            let summary = state.replace_with_import(imported);
            (summary, state.has_sufficient_capacity())
        };

        planner_info!(
            Component::Importer,
            "📋 Imported {} guests in {} groups ({} empty rows skipped)",
            summary.guests,
            summary.groups,
            summary.skipped_rows
        );
        self.after_capacity_change(capacity_ok).await;
        summary
    }

    // Local heuristic

    /// Seat unassigned groups with the first-fit heuristic
    pub async fn assign_unassigned_locally(&self) -> AssignmentReport {
        let report = {
            let mut random = self.inner.random.lock().await;
            let mut state = self.inner.state.lock().await;
            state.assign_unassigned(&mut *random)
        };

        for group in &report.unplaced {
            planner_warn!(Component::Engine, "⚠️ No table has room for group {}", group);
        }
        if !report.is_empty() {
            planner_info!(
                Component::Engine,
                "🎲 Local assignment placed {} groups, {} left over",
                report.placed.len(),
                report.unplaced.len()
            );
            self.schedule_persist();
        }
        report
    }

    // Constraints

    pub async fn add_preference_constraint(
        &self,
        a: GroupId,
        b: GroupId,
        preference: Preference,
    ) -> Result<Option<ConstraintId>, SeatingWarning> {
        let (id, capacity_ok) = {
            let mut state = self.inner.state.lock().await;
            let id = noted(state.add_preference_constraint(a, b, preference))?;
            (id, state.has_sufficient_capacity())
        };

        if let Some(id) = id {
            planner_debug!(Component::Engine, "🤝 Recorded {:?} between {} and {}", preference, a, b);
            self.after_capacity_change(capacity_ok).await;
            return Ok(Some(id));
        }
        Ok(None)
    }

    pub async fn remove_preference_constraint(&self, id: ConstraintId) -> Result<Constraint, SeatingWarning> {
        let removed = noted(self.inner.state.lock().await.remove_preference_constraint(id))?;
        self.schedule_persist();
        Ok(removed)
    }

    pub async fn unconstrained_pairs(&self) -> Vec<(GroupId, GroupId)> {
        self.read(PlannerState::unconstrained_pairs).await
    }

    // Seat order

    pub async fn seat_order_for_table(&self, table: TableId) -> Vec<GuestKey> {
        self.read(|state| state.seat_order_for_table(table)).await
    }

    pub async fn seat_view_for_table(&self, table: TableId) -> Vec<GuestKey> {
        self.read(|state| state.seat_view_for_table(table)).await
    }

    pub async fn swap_guest_seats(&self, table: TableId, a: GuestKey, b: GuestKey) -> Result<bool, SeatingWarning> {
        let swapped = noted(self.inner.state.lock().await.swap_guest_seats(table, a, b))?;
        if swapped {
            self.schedule_persist();
        }
        Ok(swapped)
    }

    pub async fn reset_seat_order(&self, table: TableId) -> bool {
        let reset = self.inner.state.lock().await.reset_seat_order(table);
        if reset {
            self.schedule_persist();
        }
        reset
    }

    // Optimization

    /// Arm the optimization timer, replacing any pending one
    pub async fn trigger_optimization(&self) {
        {
            let mut state = self.inner.state.lock().await;
            if state.phase() == OptimizationPhase::Idle {
                state.set_phase(OptimizationPhase::Debouncing);
            }
        }

        let planner = self.clone();
        self.inner
            .optimize_timer
            .schedule(self.inner.settings.timing.optimize, async move {
                planner.run_optimization_now().await;
            });
    }

    /// Call the solver immediately and apply its answer
    pub async fn run_optimization_now(&self) -> OptimizationOutcome {
        let inner = &self.inner;

        let (generation, request) = {
            let mut state = inner.state.lock().await;
            if state.tables().is_empty() || state.groups().is_empty() {
                if inner.in_flight.load(Ordering::SeqCst) == 0 {
                    state.set_phase(OptimizationPhase::Idle);
                }
                planner_debug!(Component::Engine, "⏭️ Nothing to optimize");
                return OptimizationOutcome::Skipped;
            }

            let generation = inner.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
            inner.in_flight.fetch_add(1, Ordering::SeqCst);
            state.set_phase(OptimizationPhase::Calling);
            state.set_optimizing(true);
            (generation, state.build_optimize_request(&inner.settings.solve_options))
        };

        planner_info!(
            Component::Solver,
            "🧮 Optimization #{}: {} guests, {} tables, {} affinities",
            generation,
            request.guests.len(),
            request.tables.len(),
            request.affinities.len()
        );
        let result = inner.solver.optimize(&request).await;

        let outcome = {
            let mut state = inner.state.lock().await;

            let outcome = if generation != inner.latest_generation.load(Ordering::SeqCst) {
                OptimizationOutcome::Superseded
            } else {
                match result {
                    Ok(response) if response.status.has_solution() => {
                        state.set_phase(OptimizationPhase::Applying);
                        let applied = state.apply_assignments(&response);
                        OptimizationOutcome::Applied {
                            status: response.status,
                            assigned_groups: applied.assigned_groups,
                        }
                    }
                    Ok(response) if response.status == SolverStatus::Infeasible => {
                        OptimizationOutcome::Infeasible
                    }
                    Ok(response) => OptimizationOutcome::Failed {
                        reason: format!("solver returned {}", response.status),
                    },
                    Err(e) => OptimizationOutcome::Failed { reason: e.to_string() },
                }
            };
            state.record_optimization(outcome.clone());

            let remaining = inner.in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            state.set_optimizing(remaining > 0);
            state.set_phase(if remaining > 0 {
                OptimizationPhase::Calling
            } else if inner.optimize_timer.is_pending() {
                OptimizationPhase::Debouncing
            } else {
                OptimizationPhase::Idle
            });
            outcome
        };

        match &outcome {
            OptimizationOutcome::Applied { status, assigned_groups } => {
                planner_info!(Component::Solver, "✅ Optimization #{} {}: {} groups seated", generation, status, assigned_groups);
            }
            OptimizationOutcome::Infeasible => {
                planner_warn!(Component::Solver, "⚠️ Optimization #{}: no seating satisfies the constraints", generation);
            }
            OptimizationOutcome::Failed { reason } => {
                planner_error!(Component::Solver, "❌ Optimization #{} failed: {}", generation, reason);
            }
            OptimizationOutcome::Superseded => {
                planner_debug!(Component::Solver, "⏭️ Discarded stale response #{}", generation);
            }
            OptimizationOutcome::Skipped => {}
        }

        let _ = self.persist_now().await;
        outcome
    }

    /// Run a pending debounced optimization now instead of when its timer
    /// fires
    ///
    /// # Returns
    /// The outcome, or `None` when no optimization was waiting.
    pub async fn flush_pending_optimization(&self) -> Option<OptimizationOutcome> {
        if !self.inner.optimize_timer.cancel() {
            return None;
        }
        planner_debug!(Component::Engine, "⏩ Running pending optimization early");
        Some(self.run_optimization_now().await)
    }

    pub async fn is_optimizing(&self) -> bool {
        self.read(PlannerState::is_optimizing).await
    }

    pub async fn phase(&self) -> OptimizationPhase {
        self.read(PlannerState::phase).await
    }

    pub async fn last_optimization(&self) -> Option<OptimizationOutcome> {
        self.read(|state| state.last_optimization().cloned()).await
    }

    pub async fn solver_health(&self) -> PlannerResult<HealthResponse> {
        let health = self.inner.solver.health_check().await?;
        planner_info!(Component::Solver, "💓 Solver {} (version {})", health.status, health.version);
        Ok(health)
    }

    // Persistence

    /// Arm the persistence timer, replacing any pending one
    pub fn schedule_persist(&self) {
        let planner = self.clone();
        self.inner
            .persist_timer
            .schedule(self.inner.settings.timing.persist, async move {
                let _ = planner.persist_now().await;
            });
    }

    /// Write the snapshot immediately. Failures are logged and returned.
    pub async fn persist_now(&self) -> PlannerResult<()> {
        // The write below covers whatever the pending timer would have saved
        self.inner.persist_timer.cancel();

        let snapshot = self.snapshot().await;
        self.inner.store.save(&snapshot).await.map_err(|e| {
            planner_error!(Component::Store, "❌ Snapshot save failed: {}", e);
            e
        })
    }

    /// Cancel both timers and flush the state
    pub async fn shutdown(&self) -> PlannerResult<()> {
        let had_optimization = self.inner.optimize_timer.cancel();
        if had_optimization {
            planner_debug!(Component::Engine, "⏹️ Dropped pending optimization");
            let mut state = self.inner.state.lock().await;
            if state.phase() == OptimizationPhase::Debouncing {
                state.set_phase(OptimizationPhase::Idle);
            }
        }
        self.persist_now().await
    }

    async fn after_capacity_change(&self, capacity_ok: bool) {
        self.schedule_persist();
        if capacity_ok {
            self.trigger_optimization().await;
        } else {
            planner_debug!(Component::Engine, "🪑 Not enough seats for every guest, optimization not triggered");
        }
    }
}
