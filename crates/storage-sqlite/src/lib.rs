//! SQLite storage implementation for the Vehicle Manager.
//!
//! This crate provides the direct store using Diesel ORM with SQLite.
//! It implements the vehicle source trait defined in `vehiclemanager-core`
//! and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The vehicle repository
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! All other crates (`core`, `connect`) are database-agnostic and work with traits.
//!
//! ```text
//!                server (HTTP API)
//!                       │
//!          ┌────────────┼────────────┐
//!          ▼            ▼            ▼
//!   storage-sqlite   connect   core (domain)
//!          │
//!          ▼
//!      SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod vehicles;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use vehicles::SqliteVehicleSource;

// Re-export from vehiclemanager-core for convenience
pub use vehiclemanager_core::errors::{DatabaseError, Error, Result};
