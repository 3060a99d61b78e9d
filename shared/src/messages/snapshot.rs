//! Durable planner state
//!
//! Written by the snapshot store and read back at startup. Transient UI state
//! is never persisted: the selection fields always serialize as `null`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::logging::{format_timestamp, Component};
use crate::models::{CanvasSettings, Constraint, GuestGroup, Table};
use crate::types::{GroupId, GuestKey, TableId};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlannerSnapshot {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub groups: Vec<GuestGroup>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub canvas_settings: CanvasSettings,
    #[serde(default, deserialize_with = "lenient_seat_orders")]
    pub seat_orders: HashMap<TableId, Vec<GuestKey>>,
    #[serde(default)]
    pub selected_table_id: Option<TableId>,
    #[serde(default)]
    pub highlighted_group_id: Option<GroupId>,
}

impl PlannerSnapshot {
    pub fn to_json(&self) -> Result<String, crate::SharedError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::SharedError::SerializationError { message: e.to_string() })
    }

    pub fn from_json(json: &str) -> Result<Self, crate::SharedError> {
        serde_json::from_str(json)
            .map_err(|e| crate::SharedError::DeserializationError { message: e.to_string() })
    }
}

/// Read seat orders, dropping ids that do not parse instead of rejecting the
/// whole snapshot
fn lenient_seat_orders<'de, D>(deserializer: D) -> Result<HashMap<TableId, Vec<GuestKey>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, Vec<serde_json::Value>>>::deserialize(deserializer)?;
    let mut orders = HashMap::new();

    for (table, keys) in raw.unwrap_or_default() {
        let Ok(table_id) = table.parse::<TableId>() else {
            warn!(
                component = %Component::Store,
                timestamp = format_timestamp(),
                "⚠️ Dropping seat order for unparseable table id '{}'",
                table
            );
            continue;
        };

        let order = keys
            .into_iter()
            .filter_map(|key| match key.as_str().map(str::parse::<GuestKey>) {
                Some(Ok(key)) => Some(key),
                _ => {
                    warn!(
                        component = %Component::Store,
                        timestamp = format_timestamp(),
                        "⚠️ Dropping unparseable guest key {} from the seat order of table {}",
                        key,
                        table_id
                    );
                    None
                }
            })
            .collect();
        orders.insert(table_id, order);
    }
    Ok(orders)
}
