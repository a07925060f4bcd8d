//! SQLite storage implementation for vehicles.

mod model;
mod repository;

pub use model::{NewVehicleDB, VehicleDB};
pub use repository::SqliteVehicleSource;
