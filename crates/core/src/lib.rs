//! Vehicle Manager Core - Domain entities, services, and traits.
//!
//! This crate contains the valuation policy, the vehicle model, the source
//! coordinator and the background revaluator. It is store-agnostic and
//! defines the traits implemented by the `storage-sqlite` and `connect`
//! crates.

pub mod constants;
pub mod coordinator;
pub mod envelope;
pub mod errors;
pub mod revaluation;
pub mod settings;
pub mod utils;
pub mod valuation;
pub mod vehicles;

// Re-export the types every consumer needs
pub use coordinator::{CoordinatorState, OperationOutcome, SourceCoordinator};
pub use vehicles::{Vehicle, VehicleFields};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
