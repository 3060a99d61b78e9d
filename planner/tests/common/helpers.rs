//! Test helpers and builder patterns for planner tests
//!
//! This module provides convenient helper functions and builder patterns
//! to reduce test boilerplate and improve maintainability.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ::planner::*;
use shared::{GroupId, HealthResponse, OptimizeRequest, OptimizeResponse, PlannerSnapshot, TableId};

use super::fixtures::TestFixtures;

pub type MockPlanner = Planner<MockSolverClient, MockSnapshotStore, MockRandomSource>;
pub type FakePlanner = Planner<ScriptedSolver, MemoryStore, MockRandomSource>;

/// Builder for planners wired to mockall mocks
///
/// Mocks left unconfigured get permissive defaults: the store accepts every
/// save and loads nothing, the random source keeps the original order and
/// the solver answers INFEASIBLE.
pub struct PlannerBuilder {
    solver: Option<MockSolverClient>,
    store: Option<MockSnapshotStore>,
    random: Option<MockRandomSource>,
    settings: EngineSettings,
}

impl PlannerBuilder {
    pub fn new() -> Self {
        Self {
            solver: None,
            store: None,
            random: None,
            settings: TestFixtures::settings(),
        }
    }

    /// Configure the solver mock with a setup function
    pub fn with_solver<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockSolverClient),
    {
        let mut solver = MockSolverClient::new();
        setup(&mut solver);
        self.solver = Some(solver);
        self
    }

    /// Configure the snapshot store mock with a setup function
    pub fn with_store<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockSnapshotStore),
    {
        let mut store = MockSnapshotStore::new();
        setup(&mut store);
        self.store = Some(store);
        self
    }

    /// Configure the random source mock with a setup function
    pub fn with_random<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockRandomSource),
    {
        let mut random = MockRandomSource::new();
        setup(&mut random);
        self.random = Some(random);
        self
    }

    pub fn build(self) -> MockPlanner {
        let solver = self.solver.unwrap_or_else(|| {
            let mut solver = MockSolverClient::new();
            solver
                .expect_optimize()
                .returning(|_| Ok(TestFixtures::infeasible()));
            solver
        });
        let store = self.store.unwrap_or_else(|| {
            let mut store = MockSnapshotStore::new();
            store.expect_load().returning(|| Ok(None));
            store.expect_save().returning(|_| Ok(()));
            store
        });
        let random = self.random.unwrap_or_else(TestHelpers::identity_random);

        Planner::new(solver, store, random, self.settings)
    }
}

/// In-memory snapshot store that records every save
#[derive(Clone, Default)]
pub struct MemoryStore {
    initial: Option<PlannerSnapshot>,
    saves: Arc<Mutex<Vec<PlannerSnapshot>>>,
}

impl MemoryStore {
    pub fn with_snapshot(snapshot: PlannerSnapshot) -> Self {
        Self {
            initial: Some(snapshot),
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last_saved(&self) -> Option<PlannerSnapshot> {
        self.saves.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> PlannerResult<Option<PlannerSnapshot>> {
        Ok(self.last_saved().or_else(|| self.initial.clone()))
    }

    async fn save(&self, snapshot: &PlannerSnapshot) -> PlannerResult<()> {
        self.saves.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

/// Solver that replays scripted answers, each after its own delay
#[derive(Clone, Default)]
pub struct ScriptedSolver {
    script: Arc<Mutex<VecDeque<(Duration, PlannerResult<OptimizeResponse>)>>>,
    requests: Arc<Mutex<Vec<OptimizeRequest>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next call
    pub fn then(&self, delay: Duration, result: PlannerResult<OptimizeResponse>) -> &Self {
        self.script.lock().unwrap().push_back((delay, result));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<OptimizeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SolverClient for ScriptedSolver {
    async fn optimize(&self, request: &OptimizeRequest) -> PlannerResult<OptimizeResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();

        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Err(PlannerError::SolverRequestFailed {
                message: "no scripted response".to_string(),
            }),
        }
    }

    async fn health_check(&self) -> PlannerResult<HealthResponse> {
        Ok(HealthResponse {
            status: "ok".to_string(),
            version: "test".to_string(),
        })
    }
}

/// Common test helper functions
pub struct TestHelpers;

impl TestHelpers {
    /// Random source that leaves every shuffle in its original order
    pub fn identity_random() -> MockRandomSource {
        let mut random = MockRandomSource::new();
        random.expect_next_index().returning(|upper| upper - 1);
        random
    }

    /// Planner over a scripted solver and an in-memory store
    pub fn fake_planner(solver: &ScriptedSolver, store: &MemoryStore) -> FakePlanner {
        Planner::new(
            solver.clone(),
            store.clone(),
            Self::identity_random(),
            TestFixtures::settings(),
        )
    }

    /// Planner over fakes, starting from a prepared state
    pub fn fake_planner_with(solver: &ScriptedSolver, store: &MemoryStore, state: PlannerState) -> FakePlanner {
        Planner::with_state(
            state,
            solver.clone(),
            store.clone(),
            Self::identity_random(),
            TestFixtures::settings(),
        )
    }

    /// State with the given guest rows and `tables` tables of `seats` seats
    pub fn prepared_state(rows: &[Vec<String>], tables: i64, seats: i64) -> PlannerState {
        let mut state = PlannerState::new();
        state.replace_with_import(ImportedGuests::from_rows(rows));
        if tables > 0 {
            state.add_multiple_tables(tables, seats);
        }
        state
    }

    /// Let every timer and spawned task run to completion
    pub async fn settle() {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    pub async fn group_ids<C, S, R>(planner: &Planner<C, S, R>) -> Vec<GroupId>
    where
        C: SolverClient + 'static,
        S: SnapshotStore + 'static,
        R: RandomSource + 'static,
    {
        planner.read(|s| s.groups().iter().map(|g| g.id).collect()).await
    }

    pub async fn table_ids<C, S, R>(planner: &Planner<C, S, R>) -> Vec<TableId>
    where
        C: SolverClient + 'static,
        S: SnapshotStore + 'static,
        R: RandomSource + 'static,
    {
        planner.read(|s| s.tables().iter().map(|t| t.id).collect()).await
    }

    pub async fn table_of<C, S, R>(planner: &Planner<C, S, R>, group: GroupId) -> Option<TableId>
    where
        C: SolverClient + 'static,
        S: SnapshotStore + 'static,
        R: RandomSource + 'static,
    {
        planner.read(|s| s.group(group).and_then(|g| g.table_id)).await
    }
}
