//! Core business logic modules
//!
//! This module contains pure seating logic with no I/O dependencies.
//! Apart from the injected random source, every function is deterministic.

pub mod assigner;
pub mod constraints;
pub mod importer;
pub mod protocol;
pub mod seat_order;
pub mod state;
pub mod warnings;

pub use assigner::AssignmentReport;
pub use importer::{GuestRow, ImportSummary, ImportedGuests};
pub use protocol::AppliedAssignments;
pub use state::{OptimizationOutcome, OptimizationPhase, PlannerState};
pub use warnings::SeatingWarning;
