//! Data source settings consumed at startup.

mod settings_model;

pub use settings_model::{SourceKind, SourceSettings};
