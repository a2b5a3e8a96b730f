//! Request-boundary validation
//!
//! Raw query parameters and JSON bodies are turned into typed values here.
//! Every problem is collected as a field-level error so callers get the full
//! list in one response.

use crate::service::MeasurementsQuery;
use crate::types::{
    AirMeasurement, DateRange, Granularity, GroundTemperature, Measurement, Rainfall, Timestamp,
    WindDirection, WindMeasurement,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Non-empty list of field errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-error shorthand
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when nothing was recorded
    fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        value().ok_or(self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Turns a deserialized body into a domain value
pub trait Validate {
    type Output;

    fn validate(self, now: Timestamp) -> Result<Self::Output, ValidationErrors>;
}

/// Parse RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (UTC) or bare `YYYY-MM-DD`
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Boolean query flag: `true` or `1` in any case, everything else is false
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(str::trim)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

fn past_timestamp(
    field: &str,
    raw: Option<&str>,
    now: Timestamp,
    errors: &mut ValidationErrors,
) -> Option<Timestamp> {
    match raw.and_then(parse_timestamp) {
        Some(timestamp) if timestamp <= now => Some(timestamp),
        _ => {
            errors.add(field, format!("{field} is not a valid datetime in the past"));
            None
        }
    }
}

fn whole_number(
    field: &str,
    value: Option<f64>,
    errors: &mut ValidationErrors,
) -> Option<i32> {
    let Some(value) = value else {
        errors.add(field, format!("{field} is required"));
        return None;
    };
    if !value.is_finite() || value.fract() != 0.0 {
        errors.add(field, format!("{field} must be a whole number"));
        return None;
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        errors.add(field, format!("{field} is out of range"));
        return None;
    }
    Some(value as i32)
}

/// Validate `GET /measurements` query parameters
pub fn validate_measurements_query(
    params: &HashMap<String, String>,
    now: Timestamp,
) -> Result<MeasurementsQuery, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let get = |name: &str| params.get(name).map(String::as_str);

    let from = past_timestamp("fromDate", get("fromDate"), now, &mut errors);
    let to = past_timestamp("toDate", get("toDate"), now, &mut errors);
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            errors.add("fromDate", "fromDate must not be later than toDate");
        }
    }

    let grouping = match get("grouping") {
        None | Some("") => Some(Granularity::None),
        Some(raw) => match raw.parse::<Granularity>() {
            Ok(granularity) => Some(granularity),
            Err(_) => {
                errors.add(
                    "grouping",
                    "grouping must be one of the following values: -, hourly, daily, monthly",
                );
                None
            }
        },
    };

    let include_summary = parse_flag(get("includeSummary"));
    let include_measurements = parse_flag(get("includeMeasurements"));

    errors.finish(|| {
        Some(MeasurementsQuery {
            range: DateRange::new(from?, to?),
            grouping: grouping?,
            include_summary,
            include_measurements,
        })
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirMeasurementBody {
    pub date_time: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

impl Validate for AirMeasurementBody {
    type Output = Measurement;

    fn validate(self, now: Timestamp) -> Result<Measurement, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date_time = past_timestamp("dateTime", self.date_time.as_deref(), now, &mut errors);
        let temperature = whole_number("temperature", self.temperature, &mut errors);
        let humidity = whole_number("humidity", self.humidity, &mut errors);
        let pressure = whole_number("pressure", self.pressure, &mut errors);

        errors.finish(|| {
            Some(Measurement::Air(AirMeasurement {
                date_time: date_time?,
                temperature: temperature?,
                humidity: humidity?,
                pressure: pressure?,
            }))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundTemperatureBody {
    pub date_time: Option<String>,
    pub temperature: Option<f64>,
}

impl Validate for GroundTemperatureBody {
    type Output = Measurement;

    fn validate(self, now: Timestamp) -> Result<Measurement, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date_time = past_timestamp("dateTime", self.date_time.as_deref(), now, &mut errors);
        let temperature = whole_number("temperature", self.temperature, &mut errors);

        errors.finish(|| {
            Some(Measurement::Ground(GroundTemperature {
                date_time: date_time?,
                temperature: temperature?,
            }))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindMeasurementBody {
    pub date_time: Option<String>,
    pub speed: Option<f64>,
    pub direction: Option<String>,
}

impl Validate for WindMeasurementBody {
    type Output = Measurement;

    fn validate(self, now: Timestamp) -> Result<Measurement, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date_time = past_timestamp("dateTime", self.date_time.as_deref(), now, &mut errors);
        let speed = whole_number("speed", self.speed, &mut errors);
        let direction = match self.direction.as_deref().map(str::parse::<WindDirection>) {
            Some(Ok(direction)) => Some(direction),
            _ => {
                let allowed: Vec<&str> = WindDirection::ALL.iter().map(|d| d.as_str()).collect();
                errors.add(
                    "direction",
                    format!(
                        "direction must be one of the following values: {}",
                        allowed.join(", ")
                    ),
                );
                None
            }
        };

        errors.finish(|| {
            Some(Measurement::Wind(WindMeasurement {
                date_time: date_time?,
                speed: speed?,
                direction: direction?,
            }))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallBody {
    pub date_time: Option<String>,
    pub amount: Option<f64>,
}

impl Validate for RainfallBody {
    type Output = Measurement;

    fn validate(self, now: Timestamp) -> Result<Measurement, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date_time = past_timestamp("dateTime", self.date_time.as_deref(), now, &mut errors);
        let amount = whole_number("amount", self.amount, &mut errors);

        errors.finish(|| {
            Some(Measurement::Rainfall(Rainfall {
                date_time: date_time?,
                amount: amount?,
            }))
        })
    }
}

/// Validated login request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginBody {
    pub login: Option<String>,
    pub password: Option<String>,
}

fn bounded_text(
    field: &str,
    value: Option<String>,
    max: usize,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value {
        Some(text) if (1..=max).contains(&text.chars().count()) => Some(text),
        _ => {
            errors.add(field, format!("{field} must be between 1 and {max} characters"));
            None
        }
    }
}

impl Validate for LoginBody {
    type Output = Credentials;

    fn validate(self, _now: Timestamp) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let login = bounded_text("login", self.login, 20, &mut errors);
        let password = bounded_text("password", self.password, 64, &mut errors);

        errors.finish(|| {
            Some(Credentials {
                login: login?,
                password: password?,
            })
        })
    }
}
