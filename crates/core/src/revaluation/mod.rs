//! Background revaluation of resident vehicles.

mod revaluation_service;

pub use revaluation_service::{revalue_working_set, spawn_revaluator, RevaluatorHandle};
