//! In-memory store gateway

use super::{MeasurementStore, StoreError, StoreResult, UserRecord, UserStore};
use crate::context::RequestContext;
use crate::rollups::Timestamped;
use crate::types::{
    AirMeasurement, DateRange, GroundTemperature, Measurement, Rainfall, WindMeasurement,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Tables {
    air: Vec<AirMeasurement>,
    ground: Vec<GroundTemperature>,
    wind: Vec<WindMeasurement>,
    rain: Vec<Rainfall>,
    users: HashMap<String, UserRecord>,
}

/// Store gateway keeping every table in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored measurement rows across all categories
    pub async fn len(&self) -> usize {
        let tables = self.tables.read().await;
        tables.air.len() + tables.ground.len() + tables.wind.len() + tables.rain.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn select<T: Timestamped>(rows: &[T], range: &DateRange) -> Vec<T> {
    let mut selected: Vec<T> = rows
        .iter()
        .filter(|row| range.contains(row.date_time()))
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.date_time().cmp(&a.date_time()));
    selected
}

#[async_trait::async_trait]
impl MeasurementStore for MemoryStore {
    async fn air_measurements(
        &self,
        ctx: &RequestContext,
        range: &DateRange,
    ) -> StoreResult<Vec<AirMeasurement>> {
        let rows = select(&self.tables.read().await.air, range);
        debug!(request_id = %ctx.request_id(), count = rows.len(), "selected air measurements");
        Ok(rows)
    }

    async fn ground_temperatures(
        &self,
        ctx: &RequestContext,
        range: &DateRange,
    ) -> StoreResult<Vec<GroundTemperature>> {
        let rows = select(&self.tables.read().await.ground, range);
        debug!(request_id = %ctx.request_id(), count = rows.len(), "selected ground temperatures");
        Ok(rows)
    }

    async fn wind_measurements(
        &self,
        ctx: &RequestContext,
        range: &DateRange,
    ) -> StoreResult<Vec<WindMeasurement>> {
        let rows = select(&self.tables.read().await.wind, range);
        debug!(request_id = %ctx.request_id(), count = rows.len(), "selected wind measurements");
        Ok(rows)
    }

    async fn rainfalls(&self, ctx: &RequestContext, range: &DateRange) -> StoreResult<Vec<Rainfall>> {
        let rows = select(&self.tables.read().await.rain, range);
        debug!(request_id = %ctx.request_id(), count = rows.len(), "selected rainfalls");
        Ok(rows)
    }

    async fn insert(&self, ctx: &RequestContext, measurement: &Measurement) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match measurement {
            Measurement::Air(m) => tables.air.push(m.clone()),
            Measurement::Ground(m) => tables.ground.push(m.clone()),
            Measurement::Wind(m) => tables.wind.push(m.clone()),
            Measurement::Rainfall(m) => tables.rain.push(m.clone()),
        }
        debug!(
            request_id = %ctx.request_id(),
            category = measurement.category(),
            "inserted measurement"
        );
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, login: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(login).cloned())
    }

    async fn create_user(&self, user: &UserRecord) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.login) {
            return Err(StoreError::Conflict(format!(
                "user '{}' already exists",
                user.login
            )));
        }
        tables.users.insert(user.login.clone(), user.clone());
        Ok(())
    }
}
