//! Field-level permission sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::terms::{DataClass, FieldPath};

/// The four disjoint collections produced by provision evaluation and
/// rewritten by the filtering pipeline.
///
/// `allowed` and `denied` hold data classes; `masked` and `pseudonymized`
/// hold field paths applied on top of `allowed`. The disjointness invariant
/// `allowed ∩ denied = ∅` is re-established by [`PermissionSet::normalize`].
/// `BTreeSet` keeps iteration order deterministic, which the canonical
/// snapshot output relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub allowed: BTreeSet<DataClass>,
    pub denied: BTreeSet<DataClass>,
    pub masked: BTreeSet<FieldPath>,
    pub pseudonymized: BTreeSet<FieldPath>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a class: inserted into `allowed`, removed from `denied`.
    pub fn allow(&mut self, class: DataClass) {
        self.denied.remove(&class);
        self.allowed.insert(class);
    }

    /// Withdraw a class: inserted into `denied`, removed from `allowed`.
    pub fn deny(&mut self, class: DataClass) {
        self.allowed.remove(&class);
        self.denied.insert(class);
    }

    /// Re-establish `allowed ∩ denied = ∅` by subtracting `denied`.
    pub fn normalize(&mut self) {
        for class in &self.denied {
            self.allowed.remove(class);
        }
    }

    /// True when the disjointness invariant currently holds.
    pub fn is_disjoint(&self) -> bool {
        self.allowed.is_disjoint(&self.denied)
    }

    /// True when nothing is allowed.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// The requested classes absent from `allowed`.
    pub fn missing_from<'a>(&self, requested: &'a [DataClass]) -> Vec<&'a DataClass> {
        requested.iter().filter(|dt| !self.allowed.contains(dt)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dc(s: &str) -> DataClass {
        s.parse().unwrap()
    }

    #[test]
    fn allow_then_deny_leaves_class_denied() {
        let mut set = PermissionSet::new();
        set.allow(dc("Observation.genetic"));
        set.deny(dc("Observation.genetic"));
        assert!(!set.allowed.contains(&dc("Observation.genetic")));
        assert!(set.denied.contains(&dc("Observation.genetic")));
        assert!(set.is_disjoint());
    }

    #[test]
    fn deny_then_allow_lifts_the_denial() {
        let mut set = PermissionSet::new();
        set.deny(dc("AllergyIntolerance"));
        set.allow(dc("AllergyIntolerance"));
        assert!(set.allowed.contains(&dc("AllergyIntolerance")));
        assert!(set.is_disjoint());
    }

    #[test]
    fn normalize_restores_disjointness() {
        let mut set = PermissionSet::new();
        set.allowed.insert(dc("Condition.diagnosis"));
        set.denied.insert(dc("Condition.diagnosis"));
        assert!(!set.is_disjoint());
        set.normalize();
        assert!(set.is_disjoint());
        assert!(!set.allowed.contains(&dc("Condition.diagnosis")));
    }

    #[test]
    fn missing_from_reports_uncovered_requests() {
        let mut set = PermissionSet::new();
        set.allow(dc("Patient.demographics"));
        let requested = vec![dc("Patient.demographics"), dc("Observation.genetic")];
        let missing = set.missing_from(&requested);
        assert_eq!(missing, vec![&dc("Observation.genetic")]);
    }
}
