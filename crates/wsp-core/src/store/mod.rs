//! Store gateway contracts
//!
//! The orchestrator talks to persistence only through these traits. The
//! PostgreSQL gateway lives in `wsp-db`; [`MemoryStore`] backs tests and
//! database-less local runs.

pub mod memory;

pub use memory::MemoryStore;

use crate::context::RequestContext;
use crate::types::{
    AirMeasurement, DateRange, GroundTemperature, Measurement, Rainfall, Role, WindMeasurement,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Range queries and single-row inserts for every measurement category.
///
/// Range queries include both ends of the range and return records ordered
/// by timestamp, newest first.
#[async_trait::async_trait]
pub trait MeasurementStore: Send + Sync {
    async fn air_measurements(
        &self,
        ctx: &RequestContext,
        range: &DateRange,
    ) -> StoreResult<Vec<AirMeasurement>>;

    async fn ground_temperatures(
        &self,
        ctx: &RequestContext,
        range: &DateRange,
    ) -> StoreResult<Vec<GroundTemperature>>;

    async fn wind_measurements(
        &self,
        ctx: &RequestContext,
        range: &DateRange,
    ) -> StoreResult<Vec<WindMeasurement>>;

    async fn rainfalls(&self, ctx: &RequestContext, range: &DateRange) -> StoreResult<Vec<Rainfall>>;

    /// Append one record
    async fn insert(&self, ctx: &RequestContext, measurement: &Measurement) -> StoreResult<()>;

    /// Check the store is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// Account as persisted: the password is a bcrypt hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub login: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, login: &str) -> StoreResult<Option<UserRecord>>;

    /// Fails with [`StoreError::Conflict`] when the login is taken
    async fn create_user(&self, user: &UserRecord) -> StoreResult<()>;
}
