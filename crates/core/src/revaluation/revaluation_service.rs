use std::sync::{Arc, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::constants::{MAX_SIMULATED_MILEAGE, MILEAGE_DRIFT_MAX, MILEAGE_DRIFT_MIN};
use crate::coordinator::WorkingSet;
use crate::utils::valuation_date_today;

/// Runs one revaluation pass over the resident records.
///
/// Records evicted since the snapshot was taken are skipped. For every other
/// record the mileage drift and the new value are applied under a single
/// write lock. Returns the number of records visited.
pub fn revalue_working_set<R: Rng + ?Sized>(
    working_set: &WorkingSet,
    rng: &mut R,
    as_of: NaiveDate,
) -> usize {
    let mut visited = 0;
    for weak in working_set.weak_refs() {
        let Some(record) = weak.upgrade() else {
            continue;
        };
        let mut vehicle = record.write().unwrap_or_else(PoisonError::into_inner);
        if vehicle.mileage < MAX_SIMULATED_MILEAGE {
            vehicle.mileage += rng.gen_range(MILEAGE_DRIFT_MIN..=MILEAGE_DRIFT_MAX);
        }
        vehicle.revalue(as_of);
        visited += 1;
    }
    visited
}

/// Handle to a running revaluation task.
pub struct RevaluatorHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RevaluatorHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signals the task and waits for it to exit. No tick runs after this
    /// returns.
    pub async fn stop(self) {
        // The receiver is gone only if the task already exited.
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            debug!("Revaluation task ended abnormally: {}", e);
        }
    }
}

/// Spawns the periodic revaluation task on the current tokio runtime.
///
/// The first pass runs one `period` after spawning.
pub fn spawn_revaluator(working_set: Arc<WorkingSet>, period: Duration) -> RevaluatorHandle {
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        info!("Revaluation task started ({:?} period)", period);
        let mut rng = StdRng::from_entropy();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let visited = revalue_working_set(&working_set, &mut rng, valuation_date_today());
                    debug!("Revaluation tick updated {} vehicles", visited);
                }
            }
        }
        info!("Revaluation task stopped");
    });

    RevaluatorHandle { shutdown, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::calculate_current_value;
    use crate::vehicles::{sample_vehicles, Vehicle};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn loaded_set(vehicles: Vec<Vehicle>) -> Arc<WorkingSet> {
        let set = Arc::new(WorkingSet::new());
        set.replace(vehicles);
        set
    }

    fn samples() -> Vec<Vehicle> {
        sample_vehicles()
            .into_iter()
            .zip(1..)
            .map(|(v, id)| v.into_vehicle(id, as_of()))
            .collect()
    }

    #[test]
    fn test_tick_adds_bounded_mileage_and_revalues() {
        let before = samples();
        let set = loaded_set(before.clone());
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(revalue_working_set(&set, &mut rng, as_of()), 3);

        for (old, new) in before.iter().zip(set.snapshot()) {
            let drift = new.mileage - old.mileage;
            assert!((MILEAGE_DRIFT_MIN..=MILEAGE_DRIFT_MAX).contains(&drift));
            assert_eq!(
                new.current_value,
                calculate_current_value(new.purchase_price, new.year, new.mileage, as_of())
            );
            assert_eq!(new.make, old.make);
            assert_eq!(new.purchase_price, old.purchase_price);
        }
    }

    #[test]
    fn test_mileage_cap_stops_drift_but_still_revalues() {
        let mut vehicles = samples();
        vehicles[0].mileage = MAX_SIMULATED_MILEAGE;
        vehicles[0].current_value = rust_decimal::Decimal::ONE;
        let set = loaded_set(vehicles);

        revalue_working_set(&set, &mut StdRng::seed_from_u64(1), as_of());

        let capped = &set.snapshot()[0];
        assert_eq!(capped.mileage, MAX_SIMULATED_MILEAGE);
        assert_eq!(capped.current_value, rust_decimal_macros::dec!(2500.00));
    }

    #[test]
    fn test_evicted_records_are_not_revalued() {
        let set = loaded_set(samples());
        let evicted = set.weak_refs()[0].upgrade().unwrap();
        let mileage_before = evicted.read().unwrap().mileage;

        set.evict(1);
        assert_eq!(
            revalue_working_set(&set, &mut StdRng::seed_from_u64(3), as_of()),
            2
        );
        assert_eq!(evicted.read().unwrap().mileage, mileage_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_ticks_each_period_and_stops_deterministically() {
        let set = loaded_set(samples());
        let start = set.snapshot()[0].mileage;
        let handle = spawn_revaluator(set.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(set.snapshot()[0].mileage, start);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let after_one = set.snapshot()[0].mileage;
        assert!(after_one > start);

        assert!(handle.is_running());
        handle.stop().await;

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(set.snapshot()[0].mileage, after_one);
    }
}
