//! Measurement read and write handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use wsp_core::{
    validate_measurements_query, AirMeasurementBody, GroundTemperatureBody, MeasurementsReport,
    RainfallBody, Validate, WindMeasurementBody,
};

use crate::auth::{AuthUser, READERS, WRITERS};
use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /measurements`
pub async fn get_measurements(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<MeasurementsReport>> {
    state.count_request("measurements");
    auth.require(READERS)?;

    let query = validate_measurements_query(&params, Utc::now())?;
    let report = state
        .measurements()
        .get_measurements(&auth.ctx, &query)
        .await?;

    Ok(Json(report))
}

/// Validate a write body and store the record it describes
async fn add<B: Validate<Output = wsp_core::Measurement>>(
    state: &AppState,
    auth: AuthUser,
    body: Result<Json<B>, JsonRejection>,
) -> ApiResult<StatusCode> {
    auth.require(WRITERS)?;
    let Json(body) = body?;
    let measurement = body.validate(Utc::now())?;

    state
        .measurements()
        .add_measurement(&auth.ctx, measurement)
        .await?;

    Ok(StatusCode::CREATED)
}

pub async fn add_air_measurement(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<AirMeasurementBody>, JsonRejection>,
) -> ApiResult<StatusCode> {
    state.count_request("air-measurement");
    add(&state, auth, body).await
}

pub async fn add_ground_temperature(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<GroundTemperatureBody>, JsonRejection>,
) -> ApiResult<StatusCode> {
    state.count_request("ground-temperature");
    add(&state, auth, body).await
}

pub async fn add_wind_measurement(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<WindMeasurementBody>, JsonRejection>,
) -> ApiResult<StatusCode> {
    state.count_request("wind-measurement");
    add(&state, auth, body).await
}

pub async fn add_rainfall(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<RainfallBody>, JsonRejection>,
) -> ApiResult<StatusCode> {
    state.count_request("rainfall");
    add(&state, auth, body).await
}
