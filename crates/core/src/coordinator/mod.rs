//! Coordinator module - active source selection, working set and status.

mod coordinator_model;
mod coordinator_service;
mod working_set;


pub use coordinator_model::{CoordinatorState, OperationOutcome};
pub use coordinator_service::SourceCoordinator;
pub use working_set::{ResidentVehicle, WorkingSet};
