//! Planner-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Solver request failed: {message}")]
    SolverRequestFailed { message: String },

    #[error("Solver rejected request (HTTP {status}): {message}")]
    SolverRejected { status: u16, message: String },

    #[error("Invalid solver response: {message}")]
    InvalidSolverResponse { message: String },

    #[error("Guest import failed: {message}")]
    ImportError { message: String },

    #[error("Snapshot {operation} failed on {path}: {message}")]
    PersistenceError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PlannerError {
    pub fn config(field: impl Into<String>) -> Self {
        PlannerError::ConfigurationError { field: field.into() }
    }

    pub fn import(message: impl Into<String>) -> Self {
        PlannerError::ImportError { message: message.into() }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
