//! The collection of records most recently loaded by list or search.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use chrono::NaiveDate;

use crate::vehicles::Vehicle;

/// A shared, individually lockable vehicle record.
pub type ResidentVehicle = Arc<RwLock<Vehicle>>;

/// Records resident in memory for the presentation layer and the
/// background revaluator.
///
/// The collection lock is only ever held for short, non-async sections and
/// never while a record lock is taken for writing.
#[derive(Default)]
pub struct WorkingSet {
    records: RwLock<Vec<ResidentVehicle>>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection. Records dropped here are evicted.
    pub fn replace(&self, vehicles: Vec<Vehicle>) {
        let fresh: Vec<ResidentVehicle> = vehicles
            .into_iter()
            .map(|v| Arc::new(RwLock::new(v)))
            .collect();
        *self.records.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    }

    /// Copies of the resident records, in collection order.
    pub fn snapshot(&self) -> Vec<Vehicle> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|record| record.read().unwrap_or_else(PoisonError::into_inner).clone())
            .collect()
    }

    /// Weak handles to the resident records. A handle that no longer
    /// upgrades belongs to an evicted record.
    pub fn weak_refs(&self) -> Vec<Weak<RwLock<Vehicle>>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(Arc::downgrade)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merges a stored copy of a vehicle into its resident record, if there
    /// is one, and returns the merged record.
    ///
    /// Unless `keep_mileage` is false the resident mileage is kept, since the
    /// revaluator may have advanced it past the stored value. The value is
    /// recomputed under the same record lock.
    pub fn refresh(&self, stored: &Vehicle, keep_mileage: bool, as_of: NaiveDate) -> Option<Vehicle> {
        let record = self.find(stored.id)?;
        let mut resident = record.write().unwrap_or_else(PoisonError::into_inner);
        let mileage = resident.mileage;
        *resident = stored.clone();
        if keep_mileage {
            resident.mileage = mileage;
        }
        resident.revalue(as_of);
        Some(resident.clone())
    }

    /// Removes the resident record with `vehicle_id`. Returns whether one
    /// was removed.
    pub fn evict(&self, vehicle_id: i64) -> bool {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|record| {
            record
                .read()
                .map(|v| v.id != vehicle_id)
                .unwrap_or_else(|poisoned| poisoned.into_inner().id != vehicle_id)
        });
        records.len() != before
    }

    fn find(&self, vehicle_id: i64) -> Option<ResidentVehicle> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|record| record.read().unwrap_or_else(PoisonError::into_inner).id == vehicle_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::valuation_date_today;
    use crate::vehicles::sample_vehicles;

    fn filled() -> WorkingSet {
        let today = valuation_date_today();
        let set = WorkingSet::new();
        set.replace(
            sample_vehicles()
                .into_iter()
                .zip(1..)
                .map(|(v, id)| v.into_vehicle(id, today))
                .collect(),
        );
        set
    }

    #[test]
    fn test_replace_drops_previous_records() {
        let set = filled();
        let weak = set.weak_refs();
        set.replace(Vec::new());
        assert!(set.is_empty());
        assert!(weak.iter().all(|w| w.upgrade().is_none()));
    }

    #[test]
    fn test_refresh_updates_only_matching_record() {
        let set = filled();
        let mut changed = set.snapshot()[1].clone();
        changed.color = "Gelb".to_string();

        assert!(set.refresh(&changed, true, valuation_date_today()).is_some());
        let snapshot = set.snapshot();
        assert_eq!(snapshot[1].color, "Gelb");
        assert_eq!(snapshot[0].color, "Blau");

        changed.id = 99;
        assert!(set.refresh(&changed, true, valuation_date_today()).is_none());
    }

    #[test]
    fn test_refresh_keeps_advanced_mileage_unless_replaced() {
        let today = valuation_date_today();
        let set = filled();
        let stored = set.snapshot()[1].clone();
        {
            let resident = set.weak_refs()[1].upgrade().unwrap();
            let mut vehicle = resident.write().unwrap();
            vehicle.mileage += 20;
            vehicle.revalue(today);
        }

        let mut recolored = stored.clone();
        recolored.color = "Gelb".to_string();
        let merged = set.refresh(&recolored, true, today).unwrap();
        assert_eq!(merged.color, "Gelb");
        assert_eq!(merged.mileage, stored.mileage + 20);
        assert_eq!(set.snapshot()[1], merged);

        let mut remeasured = stored.clone();
        remeasured.mileage = 10_000;
        let merged = set.refresh(&remeasured, false, today).unwrap();
        assert_eq!(merged.mileage, 10_000);
        assert_eq!(merged.current_value, remeasured.revalued(today).current_value);
    }

    #[test]
    fn test_evict_removes_record_and_invalidates_weak_ref() {
        let set = filled();
        let weak = set.weak_refs();
        assert!(set.evict(2));
        assert!(!set.evict(2));
        assert_eq!(set.len(), 2);
        assert!(weak[1].upgrade().is_none());
        assert!(weak[0].upgrade().is_some());
    }
}
