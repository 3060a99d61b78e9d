//! Domain entities shared by the planner core, the snapshot format and the
//! solver request builder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SharedError;
use crate::types::{ConstraintId, ConstraintType, GroupId, GuestKey, TableId};

/// Physical table on the canvas
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: TableId,
    pub x: f64,
    pub y: f64,
    pub seat_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Table {
    pub const MIN_SEATS: u32 = 2;
    pub const MAX_SEATS: u32 = 20;
    pub const DEFAULT_SEATS: u32 = 8;

    pub fn new(x: f64, y: f64, seat_count: i64) -> Self {
        Self {
            id: TableId::new(),
            x,
            y,
            seat_count: Self::clamp_seat_count(seat_count),
            created_at: Utc::now(),
        }
    }

    /// Clamp any requested seat count into the supported range
    pub fn clamp_seat_count(requested: i64) -> u32 {
        requested.clamp(Self::MIN_SEATS as i64, Self::MAX_SEATS as i64) as u32
    }
}

/// Guests that always share a table; the unit of assignment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GuestGroupRecord", into = "GuestGroupRecord")]
pub struct GuestGroup {
    pub id: GroupId,
    guest_names: Vec<String>,
    pub table_id: Option<TableId>,
}

impl GuestGroup {
    /// Create an unassigned group. Returns `None` for an empty name list.
    pub fn new(guest_names: Vec<String>) -> Option<Self> {
        if guest_names.is_empty() {
            return None;
        }
        Some(Self {
            id: GroupId::new(),
            guest_names,
            table_id: None,
        })
    }

    pub fn guest_names(&self) -> &[String] {
        &self.guest_names
    }

    pub fn size(&self) -> usize {
        self.guest_names.len()
    }

    pub fn is_assigned(&self) -> bool {
        self.table_id.is_some()
    }

    /// Keys of every guest in this group, in index order
    pub fn guest_keys(&self) -> impl Iterator<Item = GuestKey> + '_ {
        (0..self.guest_names.len()).map(move |index| GuestKey::new(self.id, index))
    }

    pub fn contains_key(&self, key: &GuestKey) -> bool {
        key.group == self.id && key.index < self.guest_names.len()
    }
}

/// Persisted shape of a group, carrying the redundant `size` field
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuestGroupRecord {
    id: GroupId,
    guest_names: Vec<String>,
    size: usize,
    table_id: Option<TableId>,
}

impl TryFrom<GuestGroupRecord> for GuestGroup {
    type Error = SharedError;

    fn try_from(record: GuestGroupRecord) -> Result<Self, Self::Error> {
        if record.guest_names.is_empty() {
            return Err(SharedError::InvalidGroup {
                group_id: record.id.to_string(),
                reason: "group has no guests".to_string(),
            });
        }
        if record.size != record.guest_names.len() {
            return Err(SharedError::InvalidGroup {
                group_id: record.id.to_string(),
                reason: format!(
                    "size {} does not match {} guest names",
                    record.size,
                    record.guest_names.len()
                ),
            });
        }
        Ok(Self {
            id: record.id,
            guest_names: record.guest_names,
            table_id: record.table_id,
        })
    }
}

impl From<GuestGroup> for GuestGroupRecord {
    fn from(group: GuestGroup) -> Self {
        Self {
            id: group.id,
            size: group.guest_names.len(),
            guest_names: group.guest_names,
            table_id: group.table_id,
        }
    }
}

/// Hard grouping or soft preference constraint between groups
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub id: ConstraintId,
    #[serde(rename = "type")]
    pub constraint_type: ConstraintType,
    pub group_ids: Vec<GroupId>,
    pub weight: f64,
}

impl Constraint {
    pub const SAME_TABLE_WEIGHT: f64 = 1.0;
    pub const PREFERENCE_WEIGHT: f64 = 0.5;

    pub fn same_table(group: GroupId) -> Self {
        Self {
            id: ConstraintId::new(),
            constraint_type: ConstraintType::SameTable,
            group_ids: vec![group],
            weight: Self::SAME_TABLE_WEIGHT,
        }
    }

    /// Build a two-group preference. Returns `None` for `SameTable`.
    pub fn preference(constraint_type: ConstraintType, a: GroupId, b: GroupId) -> Option<Self> {
        if !constraint_type.is_preference() {
            return None;
        }
        Some(Self {
            id: ConstraintId::new(),
            constraint_type,
            group_ids: vec![a, b],
            weight: Self::PREFERENCE_WEIGHT,
        })
    }

    /// Group count matches the constraint type
    pub fn is_well_formed(&self) -> bool {
        self.group_ids.len() == self.constraint_type.arity()
    }

    pub fn references(&self, group: GroupId) -> bool {
        self.group_ids.contains(&group)
    }

    /// True when this is a preference between `a` and `b` in either order
    pub fn links_pair(&self, a: GroupId, b: GroupId) -> bool {
        self.constraint_type.is_preference()
            && match self.group_ids.as_slice() {
                [x, y] => (*x == a && *y == b) || (*x == b && *y == a),
                _ => false,
            }
    }
}

/// Global canvas dimensions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSettings {
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1000.0,
            zoom: None,
        }
    }
}
