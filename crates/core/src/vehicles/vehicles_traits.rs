use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::settings::{SourceKind, SourceSettings};
use crate::vehicles::vehicles_model::{Vehicle, VehicleFields};

/// Trait implemented by every backing store of vehicles.
///
/// Implementations never swallow errors: a store that cannot be reached
/// returns `Error::Connectivity`, a store that answers with garbage returns
/// `Error::Protocol`. Every returned vehicle carries a freshly computed
/// `current_value`.
#[async_trait]
pub trait VehicleSourceTrait: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// All vehicles ordered by id ascending.
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>>;

    async fn get_vehicle(&self, vehicle_id: i64) -> Result<Vehicle>;

    /// Case-insensitive substring match on make or model. An empty `text`
    /// returns every vehicle.
    async fn search_vehicles(&self, text: &str) -> Result<Vec<Vehicle>>;

    /// Creates a vehicle and assigns it a new id that is never reused.
    async fn create_vehicle(&self, fields: VehicleFields) -> Result<Vehicle>;

    async fn update_vehicle(&self, vehicle_id: i64, fields: VehicleFields) -> Result<Vehicle>;

    async fn delete_vehicle(&self, vehicle_id: i64) -> Result<()>;
}

/// Builds the preferred (non-fixture) source at coordinator startup.
///
/// The core cannot depend on the storage or HTTP crates, so the host
/// application supplies this.
#[async_trait]
pub trait VehicleSourceConnector: Send + Sync {
    async fn connect(&self, settings: &SourceSettings) -> Result<Arc<dyn VehicleSourceTrait>>;
}
