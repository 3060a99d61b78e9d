//! Shared error types for the seating planner

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SharedError {
    #[error("Invalid UUID: {input}")]
    InvalidUuid { input: String },

    #[error("Invalid guest key: {input}")]
    InvalidGuestKey { input: String },

    #[error("Invalid guest group {group_id}: {reason}")]
    InvalidGroup { group_id: String, reason: String },

    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
