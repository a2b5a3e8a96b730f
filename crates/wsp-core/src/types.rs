//! Core data types for sensor measurements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type (UTC instant)
pub type Timestamp = DateTime<Utc>;

/// Compass direction reported by the wind sensor.
///
/// Declaration order matters: the predominant direction of a bucket is
/// resolved in favour of the variant declared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WindDirection {
    #[serde(rename = "N")]
    N,
    #[serde(rename = "N-NE")]
    Nne,
    #[serde(rename = "N-E")]
    Ne,
    #[serde(rename = "E-NE")]
    Ene,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "E-SE")]
    Ese,
    #[serde(rename = "S-E")]
    Se,
    #[serde(rename = "S-SE")]
    Sse,
    #[serde(rename = "S")]
    S,
    #[serde(rename = "S-SW")]
    Ssw,
    #[serde(rename = "S-W")]
    Sw,
    #[serde(rename = "W-SW")]
    Wsw,
    #[serde(rename = "W")]
    W,
    #[serde(rename = "W-NW")]
    Wnw,
    #[serde(rename = "N-W")]
    Nw,
    #[serde(rename = "N-NW")]
    Nnw,
    #[serde(rename = "-")]
    Unknown,
}

impl WindDirection {
    /// Every direction in declaration order, `Unknown` last.
    pub const ALL: [WindDirection; 17] = [
        WindDirection::N,
        WindDirection::Nne,
        WindDirection::Ne,
        WindDirection::Ene,
        WindDirection::E,
        WindDirection::Ese,
        WindDirection::Se,
        WindDirection::Sse,
        WindDirection::S,
        WindDirection::Ssw,
        WindDirection::Sw,
        WindDirection::Wsw,
        WindDirection::W,
        WindDirection::Wnw,
        WindDirection::Nw,
        WindDirection::Nnw,
        WindDirection::Unknown,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            WindDirection::N => "N",
            WindDirection::Nne => "N-NE",
            WindDirection::Ne => "N-E",
            WindDirection::Ene => "E-NE",
            WindDirection::E => "E",
            WindDirection::Ese => "E-SE",
            WindDirection::Se => "S-E",
            WindDirection::Sse => "S-SE",
            WindDirection::S => "S",
            WindDirection::Ssw => "S-SW",
            WindDirection::Sw => "S-W",
            WindDirection::Wsw => "W-SW",
            WindDirection::W => "W",
            WindDirection::Wnw => "W-NW",
            WindDirection::Nw => "N-W",
            WindDirection::Nnw => "N-NW",
            WindDirection::Unknown => "-",
        }
    }

    /// Position in declaration order
    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindDirection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WindDirection::ALL
            .iter()
            .copied()
            .find(|direction| direction.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Bucket width used when summarizing measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Granularity {
    #[default]
    #[serde(rename = "-")]
    None,
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "monthly")]
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::None => "-",
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(Granularity::None),
            "hourly" => Ok(Granularity::Hourly),
            "daily" => Ok(Granularity::Daily),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Access role carried by an issued token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Read,
    Write,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Read => "read",
            Role::Write => "write",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Role::Read),
            "write" => Ok(Role::Write),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Returned when a wire string names no enum variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant '{0}'")]
pub struct UnknownVariant(pub String);

/// Air temperature, humidity and pressure sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirMeasurement {
    pub date_time: Timestamp,
    pub temperature: i32,
    pub humidity: i32,
    pub pressure: i32,
}

/// Soil temperature sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundTemperature {
    pub date_time: Timestamp,
    pub temperature: i32,
}

/// Anemometer and wind vane sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindMeasurement {
    pub date_time: Timestamp,
    pub speed: i32,
    pub direction: WindDirection,
}

/// Rain gauge sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rainfall {
    pub date_time: Timestamp,
    pub amount: i32,
}

/// A single record of any category, as accepted by the write endpoints
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Air(AirMeasurement),
    Ground(GroundTemperature),
    Wind(WindMeasurement),
    Rainfall(Rainfall),
}

impl Measurement {
    /// Category name used in logs
    pub fn category(&self) -> &'static str {
        match self {
            Measurement::Air(_) => "air_measurement",
            Measurement::Ground(_) => "ground_temperature",
            Measurement::Wind(_) => "wind_measurement",
            Measurement::Rainfall(_) => "rainfall",
        }
    }

    pub fn date_time(&self) -> Timestamp {
        match self {
            Measurement::Air(m) => m.date_time,
            Measurement::Ground(m) => m.date_time,
            Measurement::Wind(m) => m.date_time,
            Measurement::Rainfall(m) => m.date_time,
        }
    }
}

/// Inclusive time window `[from, to]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Timestamp,
    pub to: Timestamp,
}

impl DateRange {
    pub fn new(from: Timestamp, to: Timestamp) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, timestamp: Timestamp) -> bool {
        self.from <= timestamp && timestamp <= self.to
    }
}
