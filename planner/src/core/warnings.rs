//! Non-fatal rejections
//!
//! Core operations return these instead of mutating state when a request
//! cannot be honoured. The planner logs them; they never abort an operation.

use shared::{ConstraintId, GroupId, GuestKey, TableId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeatingWarning {
    #[error("table {table} has {available} free seats, group {group} needs {needed}")]
    InsufficientCapacity {
        group: GroupId,
        table: TableId,
        needed: usize,
        available: usize,
    },

    #[error("unknown table {table}")]
    UnknownTable { table: TableId },

    #[error("unknown group {group}")]
    UnknownGroup { group: GroupId },

    #[error("guest {guest} is not in the seat order of table {table}")]
    UnknownGuest { table: TableId, guest: GuestKey },

    #[error("groups {a} and {b} already have a preference")]
    DuplicatePreference { a: GroupId, b: GroupId },

    #[error("group {group} cannot have a preference towards itself")]
    SelfPreference { group: GroupId },

    #[error("constraint {constraint} is derived from the guest list and cannot be changed")]
    ImmutableConstraint { constraint: ConstraintId },

    #[error("unknown constraint {constraint}")]
    UnknownConstraint { constraint: ConstraintId },
}
