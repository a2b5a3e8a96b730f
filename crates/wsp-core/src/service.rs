//! Measurements orchestrator
//!
//! Fans out one range query per category, waits for all of them and shapes
//! the per-category `items` / `summary` response.

use crate::context::RequestContext;
use crate::rollups::{summarize, Summarize};
use crate::store::{MeasurementStore, StoreResult};
use crate::types::{
    AirMeasurement, DateRange, Granularity, GroundTemperature, Measurement, Rainfall,
    WindMeasurement,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Validated read request
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementsQuery {
    pub range: DateRange,
    pub grouping: Granularity,
    pub include_summary: bool,
    pub include_measurements: bool,
}

/// Raw items and/or bucket summaries for one category
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "T: Serialize"))]
pub struct CategoryReport<T: Summarize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<T>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<T::Summary>>,
}

impl<T: Summarize> CategoryReport<T> {
    /// Summaries are computed from the already-fetched records
    pub fn build(records: Vec<T>, query: &MeasurementsQuery) -> Self {
        let summary = query
            .include_summary
            .then(|| summarize(&records, query.grouping));
        let items = query.include_measurements.then_some(records);

        Self { items, summary }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementsReport {
    pub air_measurements: CategoryReport<AirMeasurement>,
    pub ground_temperatures: CategoryReport<GroundTemperature>,
    pub wind_measurements: CategoryReport<WindMeasurement>,
    pub rainfalls: CategoryReport<Rainfall>,
}

/// Reads and writes measurements through a store gateway
#[derive(Clone)]
pub struct MeasurementsService {
    store: Arc<dyn MeasurementStore>,
}

impl MeasurementsService {
    pub fn new(store: Arc<dyn MeasurementStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn MeasurementStore> {
        &self.store
    }

    /// Fetch every category over the query range and assemble the report.
    ///
    /// The first failing fetch fails the whole request.
    #[instrument(skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn get_measurements(
        &self,
        ctx: &RequestContext,
        query: &MeasurementsQuery,
    ) -> StoreResult<MeasurementsReport> {
        info!(
            user = %ctx.login(),
            from = %query.range.from,
            to = %query.range.to,
            grouping = %query.grouping,
            "getMeasurements requested"
        );

        let range = &query.range;
        let (air, ground, wind, rain) = tokio::try_join!(
            self.store.air_measurements(ctx, range),
            self.store.ground_temperatures(ctx, range),
            self.store.wind_measurements(ctx, range),
            self.store.rainfalls(ctx, range),
        )?;

        debug!(
            air = air.len(),
            ground = ground.len(),
            wind = wind.len(),
            rain = rain.len(),
            "fetched measurements"
        );

        Ok(MeasurementsReport {
            air_measurements: CategoryReport::build(air, query),
            ground_temperatures: CategoryReport::build(ground, query),
            wind_measurements: CategoryReport::build(wind, query),
            rainfalls: CategoryReport::build(rain, query),
        })
    }

    /// Store a single record
    #[instrument(skip_all, fields(request_id = %ctx.request_id(), category = measurement.category()))]
    pub async fn add_measurement(
        &self,
        ctx: &RequestContext,
        measurement: Measurement,
    ) -> StoreResult<()> {
        info!(user = %ctx.login(), "add {} requested", measurement.category());
        self.store.insert(ctx, &measurement).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use crate::types::WindDirection;
    use chrono::{TimeZone, Timelike, Utc};

    fn day() -> DateRange {
        DateRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
        )
    }

    fn query(include_summary: bool, include_measurements: bool) -> MeasurementsQuery {
        MeasurementsQuery {
            range: day(),
            grouping: Granularity::Hourly,
            include_summary,
            include_measurements,
        }
    }

    async fn seeded() -> (MeasurementsService, RequestContext) {
        let store = Arc::new(MemoryStore::new());
        let service = MeasurementsService::new(store);
        let ctx = RequestContext::new("req-1");

        for (minute, temperature, humidity, pressure) in [(15, 20, 50, 1000), (45, 30, 70, 1020)] {
            let record = AirMeasurement {
                date_time: Utc.with_ymd_and_hms(2024, 1, 1, 10, minute, 0).unwrap(),
                temperature,
                humidity,
                pressure,
            };
            service
                .add_measurement(&ctx, Measurement::Air(record))
                .await
                .unwrap();
        }
        service
            .add_measurement(
                &ctx,
                Measurement::Wind(WindMeasurement {
                    date_time: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
                    speed: 7,
                    direction: WindDirection::Sse,
                }),
            )
            .await
            .unwrap();

        (service, ctx)
    }

    #[tokio::test]
    async fn hourly_summary_for_air() {
        let (service, ctx) = seeded().await;

        let report = service.get_measurements(&ctx, &query(true, false)).await.unwrap();
        let summary = report.air_measurements.summary.unwrap();

        assert!(report.air_measurements.items.is_none());
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].key, "2024-01-01/10");
        assert_eq!(summary[0].avg_temperature, 25.0);
        assert_eq!(summary[0].max_temperature, 30);
        assert_eq!(summary[0].min_temperature, 20);
        assert_eq!(summary[0].avg_humidity, 60.0);
        assert_eq!(summary[0].avg_pressure, 1010.0);
        assert_eq!(summary[0].date_time.minute(), 0);
    }

    #[tokio::test]
    async fn items_only() {
        let (service, ctx) = seeded().await;

        let report = service.get_measurements(&ctx, &query(false, true)).await.unwrap();
        let items = report.air_measurements.items.unwrap();

        assert!(report.air_measurements.summary.is_none());
        assert_eq!(items.len(), 2);
        // items keep their original timestamps, newest first
        assert_eq!(items[0].date_time.minute(), 45);
        assert_eq!(items[1].date_time.minute(), 15);
        assert!(report.rainfalls.items.unwrap().is_empty());
    }

    #[tokio::test]
    async fn both_flags_off_gives_empty_objects() {
        let (service, ctx) = seeded().await;

        let report = service.get_measurements(&ctx, &query(false, false)).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "airMeasurements": {},
                "groundTemperatures": {},
                "windMeasurements": {},
                "rainfalls": {}
            })
        );
    }

    #[tokio::test]
    async fn both_flags_on() {
        let (service, ctx) = seeded().await;

        let report = service.get_measurements(&ctx, &query(true, true)).await.unwrap();

        assert_eq!(report.wind_measurements.items.as_ref().map(Vec::len), Some(1));
        let summary = report.wind_measurements.summary.unwrap();
        assert_eq!(summary[0].key, "2024-01-01/11");
        assert_eq!(summary[0].predominant_direction, WindDirection::Sse);
        assert_eq!(report.ground_temperatures.summary, Some(Vec::new()));
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl MeasurementStore for FailingStore {
        async fn air_measurements(
            &self,
            _ctx: &RequestContext,
            _range: &DateRange,
        ) -> StoreResult<Vec<AirMeasurement>> {
            Ok(Vec::new())
        }

        async fn ground_temperatures(
            &self,
            _ctx: &RequestContext,
            _range: &DateRange,
        ) -> StoreResult<Vec<GroundTemperature>> {
            Ok(Vec::new())
        }

        async fn wind_measurements(
            &self,
            _ctx: &RequestContext,
            _range: &DateRange,
        ) -> StoreResult<Vec<WindMeasurement>> {
            Err(StoreError::Backend("connection reset".into()))
        }

        async fn rainfalls(
            &self,
            _ctx: &RequestContext,
            _range: &DateRange,
        ) -> StoreResult<Vec<Rainfall>> {
            Ok(Vec::new())
        }

        async fn insert(&self, _ctx: &RequestContext, _m: &Measurement) -> StoreResult<()> {
            Err(StoreError::Conflict("duplicate".into()))
        }

        async fn ping(&self) -> StoreResult<()> {
            Err(StoreError::Backend("down".into()))
        }
    }

    #[tokio::test]
    async fn one_failed_fetch_fails_the_request() {
        let service = MeasurementsService::new(Arc::new(FailingStore));
        let ctx = RequestContext::new("req-2");

        let result = service.get_measurements(&ctx, &query(true, true)).await;

        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn insert_errors_propagate() {
        let service = MeasurementsService::new(Arc::new(FailingStore));
        let ctx = RequestContext::new("req-3");
        let record = Rainfall {
            date_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            amount: 1,
        };

        let result = service.add_measurement(&ctx, Measurement::Rainfall(record)).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }
}
