//! Vehicle Manager Connect - HTTP access to a remote vehicles API.
//!
//! This crate provides the remote vehicle source: a `reqwest` client that
//! speaks the JSON envelope protocol of the vehicles API and implements the
//! core vehicle source trait.

pub mod client;

// Re-export commonly used types
pub use client::RemoteVehicleSource;
