//! Vehicles module - domain models, the data source trait, and the
//! in-memory fixture source.

mod fixture_source;
mod vehicles_model;
mod vehicles_traits;

#[cfg(test)]
mod vehicles_model_tests;

pub use fixture_source::{sample_vehicles, FixtureVehicleSource};
pub use vehicles_model::{matches_make_or_model, NewVehicle, Vehicle, VehicleFields};
pub use vehicles_traits::{VehicleSourceConnector, VehicleSourceTrait};
