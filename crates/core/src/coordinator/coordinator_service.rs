use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use log::{debug, info, warn};

use super::coordinator_model::{CoordinatorState, OperationOutcome};
use super::working_set::WorkingSet;
use crate::errors::Error;
use crate::revaluation::{spawn_revaluator, RevaluatorHandle};
use crate::settings::{SourceKind, SourceSettings};
use crate::utils::valuation_date_today;
use crate::vehicles::{
    FixtureVehicleSource, Vehicle, VehicleFields, VehicleSourceConnector, VehicleSourceTrait,
};

/// Loading flag and status text, always updated together.
struct Progress {
    loading: bool,
    status: String,
}

/// Clears the loading flag when dropped, including when the owning future
/// is cancelled.
struct LoadingGuard<'a> {
    progress: &'a RwLock<Progress>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.progress
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

/// Single entry point for presentation layers.
///
/// Owns exactly one active vehicle source for its whole lifetime, the
/// working set of loaded records and the background revaluation task.
/// Public operations are serialized and never return `Err`.
pub struct SourceCoordinator {
    source: Arc<dyn VehicleSourceTrait>,
    fell_back: bool,
    op_lock: tokio::sync::Mutex<()>,
    working_set: Arc<WorkingSet>,
    /// Also guards changes to the working set's membership, so `state()`
    /// never pairs a status with a stale count.
    progress: RwLock<Progress>,
    revaluator: Mutex<Option<RevaluatorHandle>>,
}

impl SourceCoordinator {
    /// Selects the active source.
    ///
    /// Offline mode serves the fixture directly. Otherwise the preferred
    /// store is built through `connector`; any failure falls back to the
    /// fixture once, with the reason recorded in the status.
    pub async fn initialize(
        settings: &SourceSettings,
        connector: &dyn VehicleSourceConnector,
    ) -> Self {
        if settings.offline_mode || settings.preferred == SourceKind::InMemoryFixture {
            info!("Offline mode enabled, serving fixture data");
            return Self::new(
                Arc::new(FixtureVehicleSource::new()),
                false,
                "Using offline mode",
            );
        }

        match connector.connect(settings).await {
            Ok(source) => {
                let status = format!("Connected to {}", source.kind());
                info!("{}", status);
                Self::new(source, false, status)
            }
            Err(e) => {
                warn!(
                    "Could not initialize {} ({} error), falling back to fixture data: {}",
                    settings.preferred,
                    e.kind().as_str(),
                    e
                );
                let status = format!(
                    "Connection to {} failed - using offline mode: {}",
                    settings.preferred, e
                );
                Self::new(Arc::new(FixtureVehicleSource::new()), true, status)
            }
        }
    }

    /// Wraps an already constructed source.
    pub fn new(
        source: Arc<dyn VehicleSourceTrait>,
        fell_back: bool,
        status: impl Into<String>,
    ) -> Self {
        Self {
            source,
            fell_back,
            op_lock: tokio::sync::Mutex::new(()),
            working_set: Arc::new(WorkingSet::new()),
            progress: RwLock::new(Progress {
                loading: false,
                status: status.into(),
            }),
            revaluator: Mutex::new(None),
        }
    }

    pub async fn list(&self) -> OperationOutcome<Vec<Vehicle>> {
        let _op = self.op_lock.lock().await;
        let _loading = self.begin("Loading vehicles...");

        match self.source.list_vehicles().await {
            Ok(vehicles) => {
                let status = format!("Loaded {} vehicles", vehicles.len());
                let resident = vehicles.clone();
                self.commit(vehicles, status, || self.working_set.replace(resident))
            }
            Err(e) => self.fail("Error loading vehicles", e),
        }
    }

    /// Searches make and model. Blank text behaves exactly like `list`.
    pub async fn search(&self, text: &str) -> OperationOutcome<Vec<Vehicle>> {
        if text.trim().is_empty() {
            return self.list().await;
        }

        let _op = self.op_lock.lock().await;
        let _loading = self.begin("Searching...");

        match self.source.search_vehicles(text).await {
            Ok(vehicles) => {
                let status = format!("Found {} vehicles matching '{}'", vehicles.len(), text);
                let resident = vehicles.clone();
                self.commit(vehicles, status, || self.working_set.replace(resident))
            }
            Err(e) => self.fail("Error searching vehicles", e),
        }
    }

    pub async fn get(&self, vehicle_id: i64) -> OperationOutcome<Vehicle> {
        let _op = self.op_lock.lock().await;
        let _loading = self.begin("Loading vehicle...");

        match self.source.get_vehicle(vehicle_id).await {
            Ok(vehicle) => {
                let status = format!("Loaded vehicle {}", vehicle.id);
                self.succeed(vehicle, status)
            }
            Err(e) => self.fail(&format!("Error loading vehicle {}", vehicle_id), e),
        }
    }

    pub async fn create(&self, fields: VehicleFields) -> OperationOutcome<Vehicle> {
        let _op = self.op_lock.lock().await;
        let _loading = self.begin("Adding vehicle...");

        match self.source.create_vehicle(fields).await {
            Ok(vehicle) => {
                debug!("Created vehicle {}", vehicle.id);
                self.succeed(vehicle, "Vehicle added successfully")
            }
            Err(e) => self.fail("Error adding vehicle", e),
        }
    }

    pub async fn update(&self, vehicle_id: i64, fields: VehicleFields) -> OperationOutcome<Vehicle> {
        let _op = self.op_lock.lock().await;
        let _loading = self.begin("Updating vehicle...");

        // Mileage the caller did not set may have drifted in memory since the
        // store last saw it.
        let keep_mileage = fields.mileage.is_none();
        match self.source.update_vehicle(vehicle_id, fields).await {
            Ok(stored) => {
                let today = valuation_date_today();
                let vehicle = match self.working_set.refresh(&stored, keep_mileage, today) {
                    Some(merged) => {
                        debug!("Refreshed resident copy of vehicle {}", merged.id);
                        merged
                    }
                    None => stored,
                };
                self.succeed(vehicle, "Vehicle updated successfully")
            }
            Err(e) => self.fail(&format!("Error updating vehicle {}", vehicle_id), e),
        }
    }

    pub async fn delete(&self, vehicle_id: i64) -> OperationOutcome<()> {
        let _op = self.op_lock.lock().await;
        let _loading = self.begin("Deleting vehicle...");

        match self.source.delete_vehicle(vehicle_id).await {
            Ok(()) => self.commit((), "Vehicle deleted successfully", || {
                if self.working_set.evict(vehicle_id) {
                    debug!("Evicted resident copy of vehicle {}", vehicle_id);
                }
            }),
            Err(e) => self.fail(&format!("Error deleting vehicle {}", vehicle_id), e),
        }
    }

    /// A consistent snapshot: status, loading flag and vehicle count are
    /// read under one lock.
    pub fn state(&self) -> CoordinatorState {
        let progress = self.progress.read().unwrap_or_else(PoisonError::into_inner);
        CoordinatorState {
            source: self.source.kind(),
            fell_back: self.fell_back,
            loading: progress.loading,
            status: progress.status.clone(),
            vehicle_count: self.working_set.len(),
        }
    }

    pub fn status(&self) -> String {
        self.progress
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
            .clone()
    }

    pub fn is_loading(&self) -> bool {
        self.progress
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .loading
    }

    /// Copies of the records currently resident in the working set.
    pub fn working_set(&self) -> Vec<Vehicle> {
        self.working_set.snapshot()
    }

    /// Starts the background revaluation task. Does nothing if the task is
    /// already running. Must be called from within a tokio runtime.
    pub fn start_revaluation(&self, period: Duration) {
        if period.is_zero() {
            warn!("Revaluation period must be positive, task not started");
            return;
        }

        let mut slot = self.revaluator.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(RevaluatorHandle::is_running) {
            debug!("Revaluation task already running");
            return;
        }
        *slot = Some(spawn_revaluator(self.working_set.clone(), period));
    }

    /// Stops the background revaluation task and waits for it to exit.
    pub async fn stop_revaluation(&self) {
        let handle = self
            .revaluator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    pub fn is_revaluating(&self) -> bool {
        self.revaluator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(RevaluatorHandle::is_running)
    }

    fn begin(&self, status: &str) -> LoadingGuard<'_> {
        *self.progress.write().unwrap_or_else(PoisonError::into_inner) = Progress {
            loading: true,
            status: status.to_string(),
        };
        LoadingGuard {
            progress: &self.progress,
        }
    }

    /// Finishes an operation. `apply` runs under the progress lock, so the
    /// working set change and the final status become visible together.
    fn commit<T>(
        &self,
        data: T,
        status: impl Into<String>,
        apply: impl FnOnce(),
    ) -> OperationOutcome<T> {
        let status = status.into();
        debug!("{}", status);
        let mut progress = self.progress.write().unwrap_or_else(PoisonError::into_inner);
        apply();
        progress.loading = false;
        progress.status = status.clone();
        OperationOutcome::success(data, status)
    }

    fn succeed<T>(&self, data: T, status: impl Into<String>) -> OperationOutcome<T> {
        self.commit(data, status, || {})
    }

    fn finish_failed(&self, status: String) {
        let mut progress = self.progress.write().unwrap_or_else(PoisonError::into_inner);
        progress.loading = false;
        progress.status = status;
    }

    fn fail<T>(&self, context: &str, err: Error) -> OperationOutcome<T> {
        let kind = err.kind();
        let status = format!("{} ({}): {}", context, kind.as_str(), err);
        warn!("{}", status);
        self.finish_failed(status.clone());
        OperationOutcome::failed(kind, status)
    }
}
