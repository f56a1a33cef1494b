//! Common types for keel: manifest specs, errors, and utilities

#![deny(missing_docs)]

pub mod error;
pub mod manifest;
pub mod spec;
pub mod telemetry;
pub mod yaml;

pub use error::Error;
pub use manifest::ClusterManifest;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Port the Kubernetes API listens on behind the load balancer
pub const API_PORT: u16 = 443;
