use std::sync::Arc;
use std::time::Instant;

use opentelemetry::{
    metrics::{Counter, MeterProvider, MetricsError},
    KeyValue,
};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use wsp_core::{MeasurementStore, MeasurementsService, UserStore};

use crate::auth::{AuthSettings, TokenIssuer};

/// Shared handler state
pub struct AppState {
    measurements: MeasurementsService,
    users: Arc<dyn UserStore>,
    tokens: TokenIssuer,
    started: Instant,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MeasurementStore>,
        users: Arc<dyn UserStore>,
        auth: &AuthSettings,
    ) -> Result<Self, MetricsError> {
        // Prometheus exporter via OpenTelemetry
        let registry = Registry::new();
        let reader = exporter().with_registry(registry.clone()).build()?;
        let provider = SdkMeterProvider::builder().with_reader(reader).build();
        let meter = provider.meter("wsp-api");

        let requests_total = meter
            .u64_counter("wsp_requests_total")
            .with_description("Total HTTP requests served, by endpoint")
            .init();

        Ok(Self {
            measurements: MeasurementsService::new(store),
            users,
            tokens: TokenIssuer::new(auth),
            started: Instant::now(),
            registry,
            provider,
            requests_total,
        })
    }

    pub fn measurements(&self) -> &MeasurementsService {
        &self.measurements
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn count_request(&self, endpoint: &'static str) {
        self.requests_total
            .add(1, &[KeyValue::new("endpoint", endpoint)]);
    }
}
