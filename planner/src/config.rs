//! Planner configuration
//!
//! Values are read from the environment, after loading a `.env` file from the
//! current directory or its parents when one exists. Every variable carries
//! the `SEATING_` prefix:
//!
//! - `SEATING_SOLVER_URL`: base URL of the solver service
//! - `SEATING_SNAPSHOT_PATH`: JSON snapshot file
//! - `SEATING_REQUEST_TIMEOUT_MS`: solver HTTP timeout
//! - `SEATING_PERSIST_DEBOUNCE_MS`, `SEATING_OPTIMIZE_DEBOUNCE_MS`: quiet periods
//! - `SEATING_SOLVER_TIME_LIMIT`, `SEATING_SOLVER_WORKERS`, `SEATING_ALLOW_EMPTY_SEATS`:
//!   options forwarded with every optimize request
//! - `SEATING_SEED`: seed for the local assigner (unset = unseeded)
//! - `SEATING_LOG_LEVEL`
//!
//! Command line flags override environment values.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use shared::SolveOptions;

use crate::error::{PlannerError, PlannerResult};

/// Quiet periods for the two debounced actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTiming {
    pub persist: Duration,
    pub optimize: Duration,
}

impl Default for DebounceTiming {
    fn default() -> Self {
        Self {
            persist: Duration::from_millis(300),
            optimize: Duration::from_millis(500),
        }
    }
}

/// Settings the engine itself needs, independent of where services live
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub timing: DebounceTiming,
    pub solve_options: SolveOptions,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timing: DebounceTiming::default(),
            solve_options: SolveOptions {
                time_limit_seconds: Some(5.0),
                num_workers: Some(1),
                allow_empty_seats: Some(true),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub solver_url: String,
    pub snapshot_path: PathBuf,
    pub request_timeout: Duration,
    pub engine: EngineSettings,
    pub seed: Option<u64>,
    pub log_level: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            solver_url: "http://127.0.0.1:8000".to_string(),
            snapshot_path: PathBuf::from("./seating.json"),
            request_timeout: Duration::from_millis(30_000),
            engine: EngineSettings::default(),
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl PlannerConfig {
    const PREFIX: &'static str = "SEATING_";

    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> PlannerResult<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (unprefixed keys are
    /// passed through `PREFIX` first)
    pub fn from_lookup<F>(lookup: F) -> PlannerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", Self::PREFIX, name));
        let mut config = Self::default();

        if let Some(url) = get("SOLVER_URL") {
            config.solver_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = get("SNAPSHOT_PATH") {
            config.snapshot_path = PathBuf::from(path);
        }
        if let Some(ms) = parse_var::<u64>("REQUEST_TIMEOUT_MS", get("REQUEST_TIMEOUT_MS"))? {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>("PERSIST_DEBOUNCE_MS", get("PERSIST_DEBOUNCE_MS"))? {
            config.engine.timing.persist = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>("OPTIMIZE_DEBOUNCE_MS", get("OPTIMIZE_DEBOUNCE_MS"))? {
            config.engine.timing.optimize = Duration::from_millis(ms);
        }
        if let Some(limit) = parse_var::<f64>("SOLVER_TIME_LIMIT", get("SOLVER_TIME_LIMIT"))? {
            if limit <= 0.0 {
                return Err(PlannerError::config("SEATING_SOLVER_TIME_LIMIT must be positive"));
            }
            config.engine.solve_options.time_limit_seconds = Some(limit);
        }
        if let Some(workers) = parse_var::<u32>("SOLVER_WORKERS", get("SOLVER_WORKERS"))? {
            if workers == 0 {
                return Err(PlannerError::config("SEATING_SOLVER_WORKERS must be at least 1"));
            }
            config.engine.solve_options.num_workers = Some(workers);
        }
        if let Some(allow) = parse_var::<bool>("ALLOW_EMPTY_SEATS", get("ALLOW_EMPTY_SEATS"))? {
            config.engine.solve_options.allow_empty_seats = Some(allow);
        }
        config.seed = parse_var::<u64>("SEED", get("SEED"))?;
        if let Some(level) = get("LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> PlannerResult<Option<T>> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| PlannerError::config(format!("SEATING_{name} has invalid value '{value}'"))),
    }
}
