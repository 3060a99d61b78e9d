//! Main entry point for the planner binary
//!
//! Each invocation loads the saved snapshot, applies one command and flushes
//! the result back to disk before exiting.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use planner::{
    services::{ConfiguredRandom, DelimitedFileSource, RealSnapshotStore, RealSolverClient},
    OptimizationOutcome, Planner, PlannerConfig, PlannerState,
};
use shared::logging::{self, Component};
use shared::{planner_info, GroupId, GuestKey, Preference, TableId};

type LivePlanner = Planner<RealSolverClient, RealSnapshotStore, ConfiguredRandom>;

/// Seating planner: assigns guest groups to tables
#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Plans table seating for guest groups, locally or with an external solver")]
pub struct Args {
    /// Snapshot file (overrides SEATING_SNAPSHOT_PATH)
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Solver base URL (overrides SEATING_SOLVER_URL)
    #[arg(long, global = true)]
    pub solver_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Seed for the local assigner (overrides SEATING_SEED)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Run the optimization this command triggers before exiting
    #[arg(long = "optimize", global = true)]
    pub optimize_after: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replace all groups with a guest list file, one group per line
    Import { file: PathBuf },

    /// Add a centred grid of tables
    AddTables {
        #[arg(long, default_value = "4")]
        count: i64,
        #[arg(long, default_value = "8")]
        seats: i64,
    },

    /// Add one table at a canvas position
    AddTable {
        #[arg(long, default_value = "0")]
        x: f64,
        #[arg(long, default_value = "0")]
        y: f64,
    },

    /// Change a table's seat count
    Seats { table: TableId, seats: i64 },

    /// Delete a table and unassign its groups
    RemoveTable { table: TableId },

    /// Seat unassigned groups with the local first-fit heuristic
    Assign,

    /// Ask the solver for an optimal seating now
    ///
    /// Other commands only arm the debounced optimization, which is dropped
    /// at exit unless `--optimize` is given.
    Optimize,

    /// Record a preference between two groups
    Prefer {
        a: GroupId,
        b: GroupId,
        preference: Preference,
    },

    /// List group pairs without a preference
    Pairs,

    /// Swap two guests' seats at a table
    Swap { table: TableId, a: GuestKey, b: GuestKey },

    /// Print tables, groups and seat orders
    Show,

    /// Check the solver's health endpoint
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PlannerConfig::from_env().context("loading configuration")?;
    if let Some(path) = args.snapshot.clone() {
        config.snapshot_path = path;
    }
    if let Some(url) = args.solver_url.clone() {
        config.solver_url = url.trim_end_matches('/').to_string();
    }
    if let Some(level) = args.log_level.clone() {
        config.log_level = level;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    logging::init_tracing_with_level(Some(&config.log_level));
    logging::log_startup(Component::Engine, &format!("planner with snapshot {}", config.snapshot_path.display()));

    let solver = RealSolverClient::new(&config.solver_url, config.request_timeout)?;
    let store = RealSnapshotStore::new(config.snapshot_path.clone());
    let random = ConfiguredRandom::from_seed(config.seed);
    let planner = Planner::new(solver, store, random, config.engine.clone());

    planner
        .load()
        .await
        .with_context(|| format!("loading snapshot {}", config.snapshot_path.display()))?;

    let mut result = run_command(&planner, args.command).await;
    if result.is_ok() && args.optimize_after {
        if let Some(outcome) = planner.flush_pending_optimization().await {
            result = report_outcome(outcome);
        }
    }

    planner.shutdown().await.context("saving snapshot")?;
    match &result {
        Ok(()) => logging::log_success(Component::Store, "Snapshot saved"),
        Err(e) => logging::log_error(Component::Engine, "Command", e),
    }
    logging::log_shutdown(Component::Engine, "command finished");
    result
}

async fn run_command(planner: &LivePlanner, command: Command) -> Result<()> {
    match command {
        Command::Import { file } => {
            let source = DelimitedFileSource::new(file);
            let summary = planner.import_guests(&source).await?;
            println!(
                "Imported {} guests in {} groups ({} empty rows skipped)",
                summary.guests, summary.groups, summary.skipped_rows
            );
        }
        Command::AddTables { count, seats } => {
            for id in planner.add_multiple_tables(count, seats).await {
                println!("{id}");
            }
        }
        Command::AddTable { x, y } => {
            println!("{}", planner.add_table(x, y).await);
        }
        Command::Seats { table, seats } => {
            let stored = planner.update_table_seat_count(table, seats).await?;
            println!("Table {table} now has {stored} seats");
        }
        Command::RemoveTable { table } => {
            let unassigned = planner.remove_table(table).await?;
            println!("Removed table {table}, {} groups unassigned", unassigned.len());
        }
        Command::Assign => {
            let report = planner.assign_unassigned_locally().await;
            println!("Placed {} groups, {} without a table", report.placed.len(), report.unplaced.len());
        }
        Command::Optimize => report_outcome(planner.run_optimization_now().await)?,
        Command::Prefer { a, b, preference } => match planner.add_preference_constraint(a, b, preference).await? {
            Some(id) => println!("Recorded constraint {id}"),
            None => println!("Neutral preference, nothing recorded"),
        },
        Command::Pairs => {
            let names = planner.read(group_labels).await;
            for (a, b) in planner.unconstrained_pairs().await {
                println!("{a}  {b}  ({} / {})", label(&names, a), label(&names, b));
            }
        }
        Command::Swap { table, a, b } => {
            if planner.swap_guest_seats(table, a, b).await? {
                println!("Swapped {a} and {b}");
            } else {
                println!("Nothing to swap");
            }
        }
        Command::Show => {
            let text = planner.read(render).await;
            print!("{text}");
        }
        Command::Health => {
            let health = planner.solver_health().await?;
            println!("{} (version {})", health.status, health.version);
        }
    }
    Ok(())
}

fn report_outcome(outcome: OptimizationOutcome) -> Result<()> {
    match outcome {
        OptimizationOutcome::Applied { status, assigned_groups } => {
            planner_info!(Component::Solver, "✅ {} seating applied", status);
            println!("{status}: {assigned_groups} groups seated");
        }
        OptimizationOutcome::Infeasible => println!("No seating satisfies the current constraints"),
        OptimizationOutcome::Skipped => println!("Nothing to optimize: add tables and guests first"),
        OptimizationOutcome::Superseded => println!("A newer optimization replaced this one"),
        OptimizationOutcome::Failed { reason } => bail!("optimization failed: {reason}"),
    }
    Ok(())
}

fn group_labels(state: &PlannerState) -> Vec<(GroupId, String)> {
    state
        .groups()
        .iter()
        .map(|g| (g.id, g.guest_names().join(", ")))
        .collect()
}

fn label(names: &[(GroupId, String)], id: GroupId) -> &str {
    names
        .iter()
        .find(|(g, _)| *g == id)
        .map(|(_, name)| name.as_str())
        .unwrap_or("?")
}

fn render(state: &PlannerState) -> String {
    let mut out = String::new();

    for (i, table) in state.tables().iter().enumerate() {
        out.push_str(&format!(
            "Table {} [{}] {}/{} seats at ({:.0}, {:.0})\n",
            i + 1,
            table.id,
            state.occupied_seats(table.id),
            table.seat_count,
            table.x,
            table.y
        ));
        for key in state.seat_view_for_table(table.id) {
            let name = state
                .group(key.group)
                .and_then(|g| g.guest_names().get(key.index))
                .map(String::as_str)
                .unwrap_or("?");
            out.push_str(&format!("    {name}  ({key})\n"));
        }
    }

    let waiting: Vec<_> = state.groups().iter().filter(|g| !g.is_assigned()).collect();
    if !waiting.is_empty() {
        out.push_str("Unassigned\n");
        for group in waiting {
            out.push_str(&format!("    {}  ({})\n", group.guest_names().join(", "), group.id));
        }
    }

    for constraint in state.preference_constraints() {
        let ids: Vec<String> = constraint.group_ids.iter().map(ToString::to_string).collect();
        out.push_str(&format!("{} {} [{}]\n", constraint.constraint_type, ids.join(" ~ "), constraint.id));
    }

    if let Some(outcome) = state.last_optimization() {
        out.push_str(&format!("Last optimization: {outcome:?}\n"));
    }
    out
}
