//! Core data types, bucketing and summary calculations for sensor measurements
//!
//! This crate holds everything the HTTP layer and the database gateway share:
//! the measurement records, the grouping key function, the aggregation
//! engine, request-boundary validation and the measurements orchestrator.

pub mod context;
pub mod grouping;
pub mod rollups;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

pub use context::*;
pub use grouping::*;
pub use rollups::*;
pub use service::*;
pub use store::*;
pub use types::*;
pub use validation::*;
