//! Range queries and inserts for the measurement tables

use crate::schema::{
    AirMeasurementRow, GroundTemperatureRow, RainfallRow, UserRow, WindMeasurementRow,
};
use crate::{DbClient, DbError, DbResult};
use tracing::{debug, instrument};
use wsp_core::{
    AirMeasurement, DateRange, GroundTemperature, Measurement, MeasurementStore, Rainfall,
    RequestContext, StoreError, StoreResult, UserRecord, UserStore, WindMeasurement,
};

impl DbClient {
    /// Get air measurements within a time range, newest first
    #[instrument(skip(self))]
    pub async fn get_air_measurements(&self, range: &DateRange) -> DbResult<Vec<AirMeasurementRow>> {
        let records = sqlx::query_as::<_, AirMeasurementRow>(
            r#"
            SELECT date_time, temperature, humidity, pressure FROM air_measurements
            WHERE date_time >= $1 AND date_time <= $2
            ORDER BY date_time DESC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(self.pool())
        .await
        .map_err(DbError::classify)?;

        debug!("Retrieved {} air measurements", records.len());
        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn get_ground_temperatures(
        &self,
        range: &DateRange,
    ) -> DbResult<Vec<GroundTemperatureRow>> {
        let records = sqlx::query_as::<_, GroundTemperatureRow>(
            r#"
            SELECT date_time, temperature FROM ground_temperatures
            WHERE date_time >= $1 AND date_time <= $2
            ORDER BY date_time DESC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(self.pool())
        .await
        .map_err(DbError::classify)?;

        debug!("Retrieved {} ground temperatures", records.len());
        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn get_wind_measurements(
        &self,
        range: &DateRange,
    ) -> DbResult<Vec<WindMeasurementRow>> {
        let records = sqlx::query_as::<_, WindMeasurementRow>(
            r#"
            SELECT date_time, speed, direction FROM wind_measurements
            WHERE date_time >= $1 AND date_time <= $2
            ORDER BY date_time DESC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(self.pool())
        .await
        .map_err(DbError::classify)?;

        debug!("Retrieved {} wind measurements", records.len());
        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn get_rainfalls(&self, range: &DateRange) -> DbResult<Vec<RainfallRow>> {
        let records = sqlx::query_as::<_, RainfallRow>(
            r#"
            SELECT date_time, amount FROM rainfalls
            WHERE date_time >= $1 AND date_time <= $2
            ORDER BY date_time DESC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(self.pool())
        .await
        .map_err(DbError::classify)?;

        debug!("Retrieved {} rainfalls", records.len());
        Ok(records)
    }

    /// Insert a single measurement row into its category table
    #[instrument(skip(self, measurement), fields(category = measurement.category()))]
    pub async fn insert_measurement(&self, measurement: &Measurement) -> DbResult<()> {
        let query = match measurement {
            Measurement::Air(m) => sqlx::query(
                "INSERT INTO air_measurements (date_time, temperature, humidity, pressure) VALUES ($1, $2, $3, $4)",
            )
            .bind(m.date_time)
            .bind(m.temperature)
            .bind(m.humidity)
            .bind(m.pressure),
            Measurement::Ground(m) => sqlx::query(
                "INSERT INTO ground_temperatures (date_time, temperature) VALUES ($1, $2)",
            )
            .bind(m.date_time)
            .bind(m.temperature),
            Measurement::Wind(m) => sqlx::query(
                "INSERT INTO wind_measurements (date_time, speed, direction) VALUES ($1, $2, $3)",
            )
            .bind(m.date_time)
            .bind(m.speed)
            .bind(m.direction.as_str()),
            Measurement::Rainfall(m) => {
                sqlx::query("INSERT INTO rainfalls (date_time, amount) VALUES ($1, $2)")
                    .bind(m.date_time)
                    .bind(m.amount)
            }
        };

        query
            .execute(self.pool())
            .await
            .map_err(DbError::classify)?;

        debug!("Inserted {} for timestamp {}", measurement.category(), measurement.date_time());
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, login: &str) -> DbResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT login, password, role FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(self.pool())
        .await
        .map_err(DbError::classify)?;

        Ok(row)
    }

    #[instrument(skip(self, user), fields(login = %user.login))]
    pub async fn insert_user(&self, user: &UserRecord) -> DbResult<()> {
        sqlx::query("INSERT INTO users (login, password, role) VALUES ($1, $2, $3)")
            .bind(&user.login)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .execute(self.pool())
            .await
            .map_err(DbError::classify)?;

        debug!("Created user {}", user.login);
        Ok(())
    }
}

fn into_records<R, T: From<R>>(rows: Vec<R>) -> Vec<T> {
    rows.into_iter().map(T::from).collect()
}

#[async_trait::async_trait]
impl MeasurementStore for DbClient {
    async fn air_measurements(
        &self,
        ctx: &RequestContext,
        range: &DateRange,
    ) -> StoreResult<Vec<AirMeasurement>> {
        debug!(request_id = %ctx.request_id(), "querying air_measurements");
        Ok(into_records(self.get_air_measurements(range).await?))
    }

    async fn ground_temperatures(
        &self,
        ctx: &RequestContext,
        range: &DateRange,
    ) -> StoreResult<Vec<GroundTemperature>> {
        debug!(request_id = %ctx.request_id(), "querying ground_temperatures");
        Ok(into_records(self.get_ground_temperatures(range).await?))
    }

    async fn wind_measurements(
        &self,
        ctx: &RequestContext,
        range: &DateRange,
    ) -> StoreResult<Vec<WindMeasurement>> {
        debug!(request_id = %ctx.request_id(), "querying wind_measurements");
        Ok(into_records(self.get_wind_measurements(range).await?))
    }

    async fn rainfalls(&self, ctx: &RequestContext, range: &DateRange) -> StoreResult<Vec<Rainfall>> {
        debug!(request_id = %ctx.request_id(), "querying rainfalls");
        Ok(into_records(self.get_rainfalls(range).await?))
    }

    async fn insert(&self, ctx: &RequestContext, measurement: &Measurement) -> StoreResult<()> {
        debug!(request_id = %ctx.request_id(), "inserting {}", measurement.category());
        Ok(self.insert_measurement(measurement).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(DbClient::ping(self).await?)
    }
}

#[async_trait::async_trait]
impl UserStore for DbClient {
    async fn find_user(&self, login: &str) -> StoreResult<Option<UserRecord>> {
        match self.get_user(login).await? {
            Some(row) => UserRecord::try_from(row)
                .map(Some)
                .map_err(StoreError::Backend),
            None => Ok(None),
        }
    }

    async fn create_user(&self, user: &UserRecord) -> StoreResult<()> {
        Ok(self.insert_user(user).await?)
    }
}
