//! Quantity-synchronised list of per-unit serial identities

use serde::{Deserialize, Serialize};

use crate::models::UnitIdentity;
use crate::types::{IdentityField, MAX_QUANTITY, MIN_QUANTITY};

/// Clamp a requested quantity to the supported range
pub fn clamp_quantity(requested: i64) -> u32 {
    requested.clamp(MIN_QUANTITY as i64, MAX_QUANTITY as i64) as u32
}

/// One identity record per unit being intaked
///
/// Growing appends empty records and shrinking drops records from the tail;
/// records that stay in range are never reordered or touched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct UnitIdentitySet {
    entries: Vec<UnitIdentity>,
}

impl Default for UnitIdentitySet {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitIdentitySet {
    /// A set sized for a quantity of one
    pub fn new() -> Self {
        Self {
            entries: vec![UnitIdentity::default()],
        }
    }

    /// Build from raw entries without syncing to any quantity
    ///
    /// Used when state comes back from outside (e.g. deserialized drafts);
    /// the validator reports any length drift.
    pub fn from_entries(entries: Vec<UnitIdentity>) -> Self {
        Self { entries }
    }

    /// Resize to `requested` (clamped to 1..=100) and return the applied quantity
    pub fn set_quantity(&mut self, requested: i64) -> u32 {
        let quantity = clamp_quantity(requested);
        let target = quantity as usize;
        if target > self.entries.len() {
            self.entries.resize_with(target, UnitIdentity::default);
        } else {
            self.entries.truncate(target);
        }
        quantity
    }

    /// Set one field of one record; out-of-range indices are ignored
    pub fn update_identity(&mut self, index: usize, field: IdentityField, value: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.set(field, value.into());
                true
            }
            None => false,
        }
    }

    /// Keep only the records at `indices`, in their current order
    pub fn retain_indices(&mut self, indices: &[usize]) {
        let mut position = 0;
        self.entries.retain(|_| {
            let keep = indices.contains(&position);
            position += 1;
            keep
        });
        if self.entries.is_empty() {
            self.entries.push(UnitIdentity::default());
        }
    }

    pub fn get(&self, index: usize) -> Option<&UnitIdentity> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[UnitIdentity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitIdentity> {
        self.entries.iter()
    }

    /// Reset to a single empty record
    pub fn clear(&mut self) {
        self.entries = vec![UnitIdentity::default()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filled(count: usize) -> UnitIdentitySet {
        let mut set = UnitIdentitySet::new();
        set.set_quantity(count as i64);
        for i in 0..count {
            set.update_identity(i, IdentityField::Imei1, format!("35000000000000{}", i));
        }
        set
    }

    #[test]
    fn test_quantity_is_clamped() {
        let mut set = UnitIdentitySet::new();
        assert_eq!(set.set_quantity(0), 1);
        assert_eq!(set.len(), 1);
        assert_eq!(set.set_quantity(-5), 1);
        assert_eq!(set.set_quantity(250), 100);
        assert_eq!(set.len(), 100);
    }

    #[test]
    fn test_growth_appends_empty_records() {
        let mut set = filled(2);
        set.set_quantity(4);
        assert_eq!(set.len(), 4);
        assert_eq!(set.get(0).unwrap().imei1, "350000000000000");
        assert!(set.get(2).unwrap().is_empty());
        assert!(set.get(3).unwrap().is_empty());
    }

    #[test]
    fn test_shrink_drops_tail() {
        let mut set = filled(5);
        set.set_quantity(2);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().imei1, "350000000000001");
    }

    #[test]
    fn test_update_touches_only_target() {
        let mut set = filled(3);
        let before = set.clone();
        assert!(set.update_identity(1, IdentityField::Imei2, "999"));
        assert_eq!(set.get(0), before.get(0));
        assert_eq!(set.get(2), before.get(2));
        assert_eq!(set.get(1).unwrap().imei1, before.get(1).unwrap().imei1);
        assert_eq!(set.get(1).unwrap().imei2, "999");
        assert!(!set.update_identity(7, IdentityField::Imei1, "x"));
    }

    #[test]
    fn test_retain_indices_keeps_order() {
        let mut set = filled(4);
        set.retain_indices(&[3, 1]);
        let imeis: Vec<&str> = set.iter().map(|e| e.imei1.as_str()).collect();
        assert_eq!(imeis, vec!["350000000000001", "350000000000003"]);

        set.retain_indices(&[]);
        assert_eq!(set.len(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Growing then shrinking back restores the original prefix
        #[test]
        fn prop_grow_then_shrink_preserves_prefix(q1 in 1u32..50, extra in 1u32..50) {
            let q2 = q1 + extra;
            let mut set = filled(q1 as usize);
            let before = set.clone();

            set.set_quantity(q2 as i64);
            prop_assert_eq!(set.len(), q2 as usize);
            set.set_quantity(q1 as i64);

            prop_assert_eq!(set, before);
        }

        /// Length always tracks the applied quantity
        #[test]
        fn prop_length_equals_quantity(steps in prop::collection::vec(-10i64..150, 1..20)) {
            let mut set = UnitIdentitySet::new();
            for requested in steps {
                let applied = set.set_quantity(requested);
                prop_assert_eq!(set.len(), applied as usize);
                prop_assert!((1..=100).contains(&applied));
            }
        }
    }
}
