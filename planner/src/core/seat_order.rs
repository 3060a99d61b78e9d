//! Seat order within a table
//!
//! A table without a stored order seats its guests group by group. Swapping
//! two guests stores a custom order that is kept until reset or until the
//! table is removed.

use shared::{GuestKey, TableId};

use super::state::PlannerState;
use super::warnings::SeatingWarning;

impl PlannerState {
    /// Guests seated at `table` in group order, each group's guests in name order
    pub fn default_seat_order(&self, table: TableId) -> Vec<GuestKey> {
        self.groups_at(table).flat_map(|g| g.guest_keys()).collect()
    }

    /// The stored order when one exists, otherwise the default order
    pub fn seat_order_for_table(&self, table: TableId) -> Vec<GuestKey> {
        match self.seat_orders.get(&table) {
            Some(order) if !order.is_empty() => order.clone(),
            _ => self.default_seat_order(table),
        }
    }

    /// Seat order reconciled with current membership
    ///
    /// Stored entries whose guest no longer sits here are dropped and guests
    /// missing from the stored order are appended in default order.
    pub fn seat_view_for_table(&self, table: TableId) -> Vec<GuestKey> {
        let seated = self.default_seat_order(table);
        let Some(stored) = self.seat_orders.get(&table) else {
            return seated;
        };

        let mut view: Vec<GuestKey> = stored
            .iter()
            .filter(|key| seated.contains(key))
            .copied()
            .collect();
        for key in seated {
            if !view.contains(&key) {
                view.push(key);
            }
        }
        view
    }

    /// Swap two guests in a table's seat order
    ///
    /// # Returns
    /// `Ok(true)` when a custom order was stored, `Ok(false)` when `a == b`.
    pub fn swap_guest_seats(&mut self, table: TableId, a: GuestKey, b: GuestKey) -> Result<bool, SeatingWarning> {
        if self.table(table).is_none() {
            return Err(SeatingWarning::UnknownTable { table });
        }
        if a == b {
            return Ok(false);
        }

        let mut order = self.seat_order_for_table(table);
        let position = |key: GuestKey| {
            order
                .iter()
                .position(|k| *k == key)
                .ok_or(SeatingWarning::UnknownGuest { table, guest: key })
        };
        let i = position(a)?;
        let j = position(b)?;

        order.swap(i, j);
        self.seat_orders.insert(table, order);
        Ok(true)
    }

    /// Drop a table's custom order. Returns whether one was stored.
    pub fn reset_seat_order(&mut self, table: TableId) -> bool {
        self.seat_orders.remove(&table).is_some()
    }
}
