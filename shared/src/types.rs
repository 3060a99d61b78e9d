//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::SharedError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_string(s: &str) -> Result<Self, SharedError> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| SharedError::InvalidUuid { input: s.to_string() })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = SharedError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_string(s)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a physical table
    TableId
);
uuid_id!(
    /// Unique identifier for a guest group
    GroupId
);
uuid_id!(
    /// Unique identifier for a seating constraint
    ConstraintId
);

/// Stable identity of one guest: the owning group plus the guest's position
/// inside that group.
///
/// The wire and persisted form is `"<groupId>:<index>"`. Parsing splits on the
/// last separator, so the index is always unambiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GuestKey {
    pub group: GroupId,
    pub index: usize,
}

impl GuestKey {
    pub const SEPARATOR: char = ':';

    pub fn new(group: GroupId, index: usize) -> Self {
        Self { group, index }
    }

    /// Key of the guest that represents the whole group towards the solver
    pub fn first_of(group: GroupId) -> Self {
        Self::new(group, 0)
    }
}

impl fmt::Display for GuestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.group, Self::SEPARATOR, self.index)
    }
}

impl FromStr for GuestKey {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SharedError::InvalidGuestKey { input: s.to_string() };
        let (group, index) = s.rsplit_once(Self::SEPARATOR).ok_or_else(invalid)?;
        let group = GroupId::from_string(group).map_err(|_| invalid())?;
        let index = index.parse::<usize>().map_err(|_| invalid())?;
        Ok(Self { group, index })
    }
}

impl TryFrom<String> for GuestKey {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GuestKey> for String {
    fn from(key: GuestKey) -> Self {
        key.to_string()
    }
}

/// Kind of seating constraint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    /// Hard constraint: all guests of one group share a table
    SameTable,
    /// Soft preference: two groups would like to sit together
    Nearby,
    /// Soft preference: two groups should be kept apart
    DifferentTables,
}

impl ConstraintType {
    /// Number of groups a constraint of this type references
    pub fn arity(self) -> usize {
        match self {
            ConstraintType::SameTable => 1,
            ConstraintType::Nearby | ConstraintType::DifferentTables => 2,
        }
    }

    pub fn is_preference(self) -> bool {
        !matches!(self, ConstraintType::SameTable)
    }

    /// Affinity score sent to the solver, if this type is expressed as one
    pub fn affinity_score(self) -> Option<i32> {
        match self {
            ConstraintType::SameTable => None,
            ConstraintType::Nearby => Some(1),
            ConstraintType::DifferentTables => Some(-1),
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintType::SameTable => write!(f, "SAME_TABLE"),
            ConstraintType::Nearby => write!(f, "NEARBY"),
            ConstraintType::DifferentTables => write!(f, "DIFFERENT_TABLES"),
        }
    }
}

/// User preference between two groups, as captured by the matching flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Like,
    Dislike,
    Neutral,
}

impl Preference {
    /// Constraint type recorded for this preference; neutral records nothing
    pub fn constraint_type(self) -> Option<ConstraintType> {
        match self {
            Preference::Like => Some(ConstraintType::Nearby),
            Preference::Dislike => Some(ConstraintType::DifferentTables),
            Preference::Neutral => None,
        }
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "like" => Ok(Preference::Like),
            "dislike" => Ok(Preference::Dislike),
            "neutral" => Ok(Preference::Neutral),
            other => Err(format!("unknown preference '{other}' (expected like, dislike or neutral)")),
        }
    }
}
