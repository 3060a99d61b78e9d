//! Guest list import
//!
//! Turns raw rows into groups plus their derived SAME_TABLE constraints.
//! Building the import never touches the state; only a fully built import is
//! swapped in, so a failed read leaves everything as it was.

use shared::{Constraint, GuestGroup};

use super::state::PlannerState;

/// One validated guest list row: at least one trimmed, non-empty name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestRow {
    names: Vec<String>,
}

impl GuestRow {
    /// Validate raw cells. Empty and whitespace-only cells are dropped;
    /// returns `None` when nothing is left.
    pub fn from_cells<I, S>(cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = cells
            .into_iter()
            .map(|cell| cell.as_ref().trim().to_string())
            .filter(|cell| !cell.is_empty())
            .collect();

        if names.is_empty() {
            None
        } else {
            Some(Self { names })
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_group(self) -> Option<GuestGroup> {
        GuestGroup::new(self.names)
    }
}

/// Domain content produced by an import, ready to replace the state
#[derive(Debug, Clone, Default)]
pub struct ImportedGuests {
    pub groups: Vec<GuestGroup>,
    pub constraints: Vec<Constraint>,
    pub skipped_rows: usize,
}

impl ImportedGuests {
    /// Build groups and SAME_TABLE constraints from raw rows
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let mut imported = Self::default();

        for row in rows {
            match GuestRow::from_cells(row).and_then(GuestRow::into_group) {
                Some(group) => {
                    imported.constraints.push(Constraint::same_table(group.id));
                    imported.groups.push(group);
                }
                None => imported.skipped_rows += 1,
            }
        }

        imported
    }

    pub fn guest_count(&self) -> usize {
        self.groups.iter().map(GuestGroup::size).sum()
    }
}

/// Counts reported after an import replaced the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub groups: usize,
    pub guests: usize,
    pub skipped_rows: usize,
}

impl PlannerState {
    /// Replace the whole domain with freshly imported guests
    pub fn replace_with_import(&mut self, imported: ImportedGuests) -> ImportSummary {
        let summary = ImportSummary {
            groups: imported.groups.len(),
            guests: imported.guest_count(),
            skipped_rows: imported.skipped_rows,
        };

        self.tables.clear();
        self.seat_orders.clear();
        self.groups = imported.groups;
        self.constraints = imported.constraints;
        self.selected_table_id = None;
        self.highlighted_group_id = None;

        summary
    }
}
