//! Service implementations
//!
//! This module contains real implementations of all service traits.
//! These are the production implementations that handle actual I/O operations.

pub mod random;
pub mod row_source;
pub mod snapshot_store;
pub mod solver_client;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use random::{ConfiguredRandom, SeededRandom, ThreadRandom};
pub use row_source::{DelimitedError, DelimitedFileSource};
pub use snapshot_store::RealSnapshotStore;
pub use solver_client::RealSolverClient;
