//! Database schema types
//!
//! Row structs mirror the tables one to one; conversion into the domain
//! records happens here so queries stay free of mapping code.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::warn;
use wsp_core::{
    AirMeasurement, GroundTemperature, Rainfall, Role, UserRecord, WindDirection, WindMeasurement,
};

#[derive(Debug, Clone, FromRow)]
pub struct AirMeasurementRow {
    pub date_time: DateTime<Utc>,
    pub temperature: i32,
    pub humidity: i32,
    pub pressure: i32,
}

impl From<AirMeasurementRow> for AirMeasurement {
    fn from(row: AirMeasurementRow) -> Self {
        Self {
            date_time: row.date_time,
            temperature: row.temperature,
            humidity: row.humidity,
            pressure: row.pressure,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct GroundTemperatureRow {
    pub date_time: DateTime<Utc>,
    pub temperature: i32,
}

impl From<GroundTemperatureRow> for GroundTemperature {
    fn from(row: GroundTemperatureRow) -> Self {
        Self {
            date_time: row.date_time,
            temperature: row.temperature,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct WindMeasurementRow {
    pub date_time: DateTime<Utc>,
    pub speed: i32,
    /// Wire value of the direction, `-` when unknown
    pub direction: String,
}

impl From<WindMeasurementRow> for WindMeasurement {
    fn from(row: WindMeasurementRow) -> Self {
        Self {
            date_time: row.date_time,
            speed: row.speed,
            direction: row.direction.parse().unwrap_or_else(|_| {
                warn!(direction = %row.direction, "unrecognized stored wind direction");
                WindDirection::Unknown
            }),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RainfallRow {
    pub date_time: DateTime<Utc>,
    pub amount: i32,
}

impl From<RainfallRow> for Rainfall {
    fn from(row: RainfallRow) -> Self {
        Self {
            date_time: row.date_time,
            amount: row.amount,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub login: String,
    pub password: String,
    pub role: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|_| format!("user '{}' has unknown role '{}'", row.login, row.role))?;
        Ok(Self {
            login: row.login,
            password_hash: row.password,
            role,
        })
    }
}

/// DDL run by [`crate::DbClient::ensure_schema`], one statement per entry
pub const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS air_measurements (
        id BIGSERIAL PRIMARY KEY,
        date_time TIMESTAMPTZ NOT NULL,
        temperature INTEGER NOT NULL,
        humidity INTEGER NOT NULL,
        pressure INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS air_measurements_date_time_idx ON air_measurements (date_time)",
    r#"CREATE TABLE IF NOT EXISTS ground_temperatures (
        id BIGSERIAL PRIMARY KEY,
        date_time TIMESTAMPTZ NOT NULL,
        temperature INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS ground_temperatures_date_time_idx ON ground_temperatures (date_time)",
    r#"CREATE TABLE IF NOT EXISTS wind_measurements (
        id BIGSERIAL PRIMARY KEY,
        date_time TIMESTAMPTZ NOT NULL,
        speed INTEGER NOT NULL,
        direction VARCHAR(4) NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS wind_measurements_date_time_idx ON wind_measurements (date_time)",
    r#"CREATE TABLE IF NOT EXISTS rainfalls (
        id BIGSERIAL PRIMARY KEY,
        date_time TIMESTAMPTZ NOT NULL,
        amount INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS rainfalls_date_time_idx ON rainfalls (date_time)",
    r#"CREATE TABLE IF NOT EXISTS users (
        login VARCHAR(20) PRIMARY KEY,
        password VARCHAR(100) NOT NULL,
        role VARCHAR(10) NOT NULL
    )"#,
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_schema_creates_every_table() {
        for table in [
            "air_measurements",
            "ground_temperatures",
            "wind_measurements",
            "rainfalls",
            "users",
        ] {
            let ddl = format!("CREATE TABLE IF NOT EXISTS {table} (");
            assert!(SCHEMA.iter().any(|s| s.starts_with(&ddl)), "missing {table}");
        }
    }

    #[test]
    fn test_wind_row_direction() {
        let date_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let row = WindMeasurementRow {
            date_time,
            speed: 4,
            direction: "W-NW".into(),
        };
        assert_eq!(WindMeasurement::from(row).direction, WindDirection::Wnw);

        let row = WindMeasurementRow {
            date_time,
            speed: 4,
            direction: "??".into(),
        };
        assert_eq!(WindMeasurement::from(row).direction, WindDirection::Unknown);
    }

    #[test]
    fn test_user_row_role() {
        let row = UserRow {
            login: "sensors".into(),
            password: "$2b$12$hash".into(),
            role: "write".into(),
        };
        let user = UserRecord::try_from(row).unwrap();
        assert_eq!(user.role, Role::Write);
        assert_eq!(user.password_hash, "$2b$12$hash");

        let row = UserRow {
            login: "x".into(),
            password: String::new(),
            role: "admin".into(),
        };
        assert!(UserRecord::try_from(row).is_err());
    }
}
