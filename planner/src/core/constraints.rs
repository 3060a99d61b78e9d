//! Preference constraint management
//!
//! SAME_TABLE constraints come from the guest list and are read-only here.
//! Preferences are user-created, one per unordered pair of groups.

use shared::{Constraint, ConstraintId, ConstraintType, GroupId, Preference};

use super::state::PlannerState;
use super::warnings::SeatingWarning;

impl PlannerState {
    /// Record a preference between two groups
    ///
    /// # Returns
    /// `Ok(None)` for a neutral preference, `Ok(Some(id))` for the stored
    /// constraint, or a warning when nothing was recorded.
    pub fn add_preference_constraint(
        &mut self,
        a: GroupId,
        b: GroupId,
        preference: Preference,
    ) -> Result<Option<ConstraintId>, SeatingWarning> {
        let Some(constraint_type) = preference.constraint_type() else {
            return Ok(None);
        };

        for id in [a, b] {
            if self.group(id).is_none() {
                return Err(SeatingWarning::UnknownGroup { group: id });
            }
        }
        if a == b {
            return Err(SeatingWarning::SelfPreference { group: a });
        }
        if self.has_preference(a, b) {
            return Err(SeatingWarning::DuplicatePreference { a, b });
        }

        let constraint = Constraint::preference(constraint_type, a, b)
            .ok_or(SeatingWarning::SelfPreference { group: a })?;
        let id = constraint.id;
        self.constraints.push(constraint);
        Ok(Some(id))
    }

    /// Delete a user preference. Guest list constraints are refused.
    pub fn remove_preference_constraint(&mut self, id: ConstraintId) -> Result<Constraint, SeatingWarning> {
        let index = self
            .constraints
            .iter()
            .position(|c| c.id == id)
            .ok_or(SeatingWarning::UnknownConstraint { constraint: id })?;

        if self.constraints[index].constraint_type == ConstraintType::SameTable {
            return Err(SeatingWarning::ImmutableConstraint { constraint: id });
        }
        Ok(self.constraints.remove(index))
    }

    /// Any preference exists between `a` and `b`, in either order
    pub fn has_preference(&self, a: GroupId, b: GroupId) -> bool {
        self.constraints.iter().any(|c| c.links_pair(a, b))
    }

    pub fn preference_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.constraint_type.is_preference())
    }

    /// Every unordered group pair still lacking a preference, in group order
    pub fn unconstrained_pairs(&self) -> Vec<(GroupId, GroupId)> {
        let mut pairs = Vec::new();
        for (i, first) in self.groups.iter().enumerate() {
            for second in &self.groups[i + 1..] {
                if !self.has_preference(first.id, second.id) {
                    pairs.push((first.id, second.id));
                }
            }
        }
        pairs
    }
}
