//! Planning for many-to-many join-table synchronization.
//!
//! A sync replaces the set of related ids (a role's permissions, a user's
//! roles) with a desired set. The plan is computed here and applied by the
//! repository inside a transaction.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::DbId;

/// Rows to insert into and delete from a join table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncPlan {
    /// Ids present in the desired set but not currently attached.
    pub attach: Vec<DbId>,
    /// Ids currently attached but absent from the desired set.
    pub detach: Vec<DbId>,
}

impl SyncPlan {
    pub fn is_noop(&self) -> bool {
        self.attach.is_empty() && self.detach.is_empty()
    }
}

/// Outcome of an applied sync, returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SyncResult {
    pub attached: Vec<DbId>,
    pub detached: Vec<DbId>,
}

impl From<SyncPlan> for SyncResult {
    fn from(plan: SyncPlan) -> Self {
        Self {
            attached: plan.attach,
            detached: plan.detach,
        }
    }
}

/// Compute the attach/detach sets that turn `current` into `desired`.
///
/// Duplicates in either input are ignored. Both output lists are sorted
/// ascending.
pub fn plan_sync(current: &[DbId], desired: &[DbId]) -> SyncPlan {
    let current: BTreeSet<DbId> = current.iter().copied().collect();
    let desired: BTreeSet<DbId> = desired.iter().copied().collect();

    SyncPlan {
        attach: desired.difference(&current).copied().collect(),
        detach: current.difference(&desired).copied().collect(),
    }
}

/// Return the ids in `requested` that are not in `known`, sorted and deduplicated.
pub fn unknown_ids(requested: &[DbId], known: &[DbId]) -> Vec<DbId> {
    let known: BTreeSet<DbId> = known.iter().copied().collect();
    requested
        .iter()
        .copied()
        .filter(|id| !known.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(current: &[DbId], plan: &SyncPlan) -> BTreeSet<DbId> {
        let mut set: BTreeSet<DbId> = current.iter().copied().collect();
        for id in &plan.detach {
            set.remove(id);
        }
        set.extend(plan.attach.iter().copied());
        set
    }

    #[test]
    fn attaches_and_detaches_difference() {
        let plan = plan_sync(&[1, 2, 3], &[3, 4, 5]);
        assert_eq!(plan.attach, vec![4, 5]);
        assert_eq!(plan.detach, vec![1, 2]);
    }

    #[test]
    fn identical_sets_are_noop() {
        let plan = plan_sync(&[2, 1], &[1, 2, 2]);
        assert!(plan.is_noop());
    }

    #[test]
    fn empty_desired_detaches_everything() {
        let plan = plan_sync(&[7, 3], &[]);
        assert_eq!(plan.detach, vec![3, 7]);
        assert!(plan.attach.is_empty());
    }

    #[test]
    fn applying_plan_yields_desired_set() {
        let current = [10, 11, 12, 40];
        let desired = [12, 12, 13, 40, 41];
        let plan = plan_sync(&current, &desired);
        let expected: BTreeSet<DbId> = desired.iter().copied().collect();
        assert_eq!(apply(&current, &plan), expected);
    }

    #[test]
    fn unknown_ids_are_reported_once() {
        assert_eq!(unknown_ids(&[5, 1, 5, 9], &[1, 2, 3]), vec![5, 9]);
        assert!(unknown_ids(&[1, 2], &[1, 2, 3]).is_empty());
    }
}
