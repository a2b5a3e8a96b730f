//! Bucketing and summary calculations over fetched measurements

use crate::grouping::GroupKey;
use crate::types::{
    AirMeasurement, Granularity, GroundTemperature, Rainfall, Timestamp, WindDirection,
    WindMeasurement,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A record that carries the instant it was taken
pub trait Timestamped: Clone {
    fn date_time(&self) -> Timestamp;

    /// Copy of the record with its timestamp replaced
    fn with_date_time(&self, date_time: Timestamp) -> Self;
}

/// A record category that can be reduced to per-bucket statistics
pub trait Summarize: Timestamped {
    type Summary: Serialize + Debug + Clone + PartialEq;

    fn summarize(bucket: &Bucket<Self>) -> Self::Summary;
}

/// Records that share a bucket key under one granularity
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<T> {
    pub key: String,
    pub date_time: Timestamp,
    pub records: Vec<T>,
}

impl<T> Bucket<T> {
    pub fn new(key: impl Into<String>, date_time: Timestamp) -> Self {
        Self {
            key: key.into(),
            date_time,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split records into buckets keyed by their group key.
///
/// Each bucket holds copies of its records with the timestamp replaced by
/// the bucket's rounded timestamp, in input order.
pub fn partition<T: Timestamped>(records: &[T], granularity: Granularity) -> BTreeMap<String, Bucket<T>> {
    let mut buckets: BTreeMap<String, Bucket<T>> = BTreeMap::new();

    for record in records {
        let group = GroupKey::new(record.date_time(), granularity);
        buckets
            .entry(group.key.clone())
            .or_insert_with(|| Bucket::new(group.key, group.date_time))
            .records
            .push(record.with_date_time(group.date_time));
    }

    buckets
}

/// Summaries for every bucket, ordered by bucket key
pub fn summarize<T: Summarize>(records: &[T], granularity: Granularity) -> Vec<T::Summary> {
    partition(records, granularity)
        .values()
        .map(T::summarize)
        .collect()
}

/// Round the stored value to one decimal place.
///
/// Values that sit exactly on a half go away from zero; anything else rounds
/// to the nearest tenth of its exact binary value, so 7/20 (stored just
/// below 0.35) gives 0.3.
pub fn round_one_decimal(value: f64) -> f64 {
    let scaled = value * 10.0;
    let exact_tie = value.mul_add(10.0, -scaled) == 0.0 && scaled.fract().abs() == 0.5;
    if exact_tie {
        return scaled.round() / 10.0;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Running min/max/avg over whole-number observations.
///
/// An accumulator that saw nothing reports zero for every statistic.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    count: usize,
    sum: i64,
    min: Option<i32>,
    max: Option<i32>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: i32) {
        self.count += 1;
        self.sum += i64::from(value);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn min(&self) -> i32 {
        self.min.unwrap_or(0)
    }

    pub fn max(&self) -> i32 {
        self.max.unwrap_or(0)
    }

    /// Mean rounded to one decimal
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round_one_decimal(self.sum as f64 / self.count as f64)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl FromIterator<i32> for Accumulator {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let mut acc = Accumulator::new();
        for value in iter {
            acc.add(value);
        }
        acc
    }
}

/// Most frequent direction; ties go to the direction declared first.
pub fn predominant_direction<I>(directions: I) -> WindDirection
where
    I: IntoIterator<Item = WindDirection>,
{
    let mut counts = [0usize; WindDirection::ALL.len()];
    for direction in directions {
        counts[direction.ordinal()] += 1;
    }

    let mut best = WindDirection::Unknown;
    let mut best_count = 0;
    for direction in WindDirection::ALL {
        let count = counts[direction.ordinal()];
        if count > best_count {
            best = direction;
            best_count = count;
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirMeasurementSummary {
    pub key: String,
    pub date_time: Timestamp,
    pub max_temperature: i32,
    pub avg_temperature: f64,
    pub min_temperature: i32,
    pub max_pressure: i32,
    pub avg_pressure: f64,
    pub min_pressure: i32,
    pub max_humidity: i32,
    pub avg_humidity: f64,
    pub min_humidity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundTemperatureSummary {
    pub key: String,
    pub date_time: Timestamp,
    pub max_temperature: i32,
    pub avg_temperature: f64,
    pub min_temperature: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindMeasurementSummary {
    pub key: String,
    pub date_time: Timestamp,
    pub avg_speed: f64,
    pub max_gust: i32,
    pub predominant_direction: WindDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallSummary {
    pub key: String,
    pub date_time: Timestamp,
    pub max_amount: i32,
    pub avg_amount: f64,
    pub min_amount: i32,
}

impl Timestamped for AirMeasurement {
    fn date_time(&self) -> Timestamp {
        self.date_time
    }

    fn with_date_time(&self, date_time: Timestamp) -> Self {
        Self {
            date_time,
            ..self.clone()
        }
    }
}

impl Summarize for AirMeasurement {
    type Summary = AirMeasurementSummary;

    fn summarize(bucket: &Bucket<Self>) -> Self::Summary {
        let temperature: Accumulator = bucket.records.iter().map(|r| r.temperature).collect();
        let pressure: Accumulator = bucket.records.iter().map(|r| r.pressure).collect();
        let humidity: Accumulator = bucket.records.iter().map(|r| r.humidity).collect();

        AirMeasurementSummary {
            key: bucket.key.clone(),
            date_time: bucket.date_time,
            max_temperature: temperature.max(),
            avg_temperature: temperature.avg(),
            min_temperature: temperature.min(),
            max_pressure: pressure.max(),
            avg_pressure: pressure.avg(),
            min_pressure: pressure.min(),
            max_humidity: humidity.max(),
            avg_humidity: humidity.avg(),
            min_humidity: humidity.min(),
        }
    }
}

impl Timestamped for GroundTemperature {
    fn date_time(&self) -> Timestamp {
        self.date_time
    }

    fn with_date_time(&self, date_time: Timestamp) -> Self {
        Self {
            date_time,
            ..self.clone()
        }
    }
}

impl Summarize for GroundTemperature {
    type Summary = GroundTemperatureSummary;

    fn summarize(bucket: &Bucket<Self>) -> Self::Summary {
        let temperature: Accumulator = bucket.records.iter().map(|r| r.temperature).collect();

        GroundTemperatureSummary {
            key: bucket.key.clone(),
            date_time: bucket.date_time,
            max_temperature: temperature.max(),
            avg_temperature: temperature.avg(),
            min_temperature: temperature.min(),
        }
    }
}

impl Timestamped for WindMeasurement {
    fn date_time(&self) -> Timestamp {
        self.date_time
    }

    fn with_date_time(&self, date_time: Timestamp) -> Self {
        Self {
            date_time,
            ..self.clone()
        }
    }
}

impl Summarize for WindMeasurement {
    type Summary = WindMeasurementSummary;

    fn summarize(bucket: &Bucket<Self>) -> Self::Summary {
        let speed: Accumulator = bucket.records.iter().map(|r| r.speed).collect();

        WindMeasurementSummary {
            key: bucket.key.clone(),
            date_time: bucket.date_time,
            avg_speed: speed.avg(),
            max_gust: speed.max(),
            predominant_direction: predominant_direction(bucket.records.iter().map(|r| r.direction)),
        }
    }
}

impl Timestamped for Rainfall {
    fn date_time(&self) -> Timestamp {
        self.date_time
    }

    fn with_date_time(&self, date_time: Timestamp) -> Self {
        Self {
            date_time,
            ..self.clone()
        }
    }
}

impl Summarize for Rainfall {
    type Summary = RainfallSummary;

    fn summarize(bucket: &Bucket<Self>) -> Self::Summary {
        let amount: Accumulator = bucket.records.iter().map(|r| r.amount).collect();

        RainfallSummary {
            key: bucket.key.clone(),
            date_time: bucket.date_time,
            max_amount: amount.max(),
            avg_amount: amount.avg(),
            min_amount: amount.min(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(d: u32, h: u32, mi: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, d, h, mi, 0).unwrap()
    }

    fn ground(date_time: Timestamp, temperature: i32) -> GroundTemperature {
        GroundTemperature {
            date_time,
            temperature,
        }
    }

    fn wind(direction: WindDirection, speed: i32) -> WindMeasurement {
        WindMeasurement {
            date_time: ts(1, 12, 0),
            speed,
            direction,
        }
    }

    #[test]
    fn test_accumulator_min_max() {
        let acc: Accumulator = [10, 5, 15].into_iter().collect();
        assert_eq!(acc.min(), 5);
        assert_eq!(acc.max(), 15);
        assert_eq!(acc.count(), 3);
    }

    #[test]
    fn test_accumulator_avg() {
        let acc: Accumulator = [10, 20, 30].into_iter().collect();
        assert_eq!(acc.avg(), 20.0);

        let acc: Accumulator = [1, 2].into_iter().collect();
        assert_eq!(acc.avg(), 1.5);

        let acc: Accumulator = [1, 1, 2].into_iter().collect();
        assert_eq!(acc.avg(), 1.3);
    }

    #[test]
    fn test_accumulator_empty() {
        let acc = Accumulator::new();
        assert_eq!(acc.min(), 0);
        assert_eq!(acc.max(), 0);
        assert_eq!(acc.avg(), 0.0);
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(25.0), 25.0);
        assert_eq!(round_one_decimal(2.25), 2.3);
        assert_eq!(round_one_decimal(-2.25), -2.3);
        assert_eq!(round_one_decimal(16.666_666), 16.7);
        assert_eq!(round_one_decimal(7.0 / 20.0), 0.3);
        assert_eq!(round_one_decimal(23.0 / 20.0), 1.1);
        assert_eq!(round_one_decimal(-7.0 / 20.0), -0.3);
    }

    #[test]
    fn test_accumulator_avg_just_below_half() {
        // 7/20 and 23/20 are stored slightly below 0.35 and 1.15
        let acc: Accumulator = [1; 7].into_iter().chain([0; 13]).collect();
        assert_eq!(acc.avg(), 0.3);

        let acc: Accumulator = [2; 3].into_iter().chain([1; 17]).collect();
        assert_eq!(acc.avg(), 1.1);

        let acc: Accumulator = [-1; 7].into_iter().chain([0; 13]).collect();
        assert_eq!(acc.avg(), -0.3);
    }

    #[test]
    fn test_daily_summary_single_bucket() {
        let records = vec![
            ground(ts(1, 1, 0), 10),
            ground(ts(1, 12, 0), 20),
            ground(ts(1, 23, 0), 30),
        ];

        let summary = summarize(&records, Granularity::Daily);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].key, "2024-01-01");
        assert_eq!(summary[0].date_time, ts(1, 0, 0));
        assert_eq!(summary[0].avg_temperature, 20.0);
        assert_eq!(summary[0].max_temperature, 30);
        assert_eq!(summary[0].min_temperature, 10);
    }

    #[test]
    fn test_partition_covers_every_record() {
        let records: Vec<_> = (0..48)
            .map(|i| ground(ts(1 + i / 24, i % 24, 30), i as i32))
            .collect();

        let buckets = partition(&records, Granularity::Hourly);
        let total: usize = buckets.values().map(Bucket::len).sum();

        assert_eq!(buckets.len(), 48);
        assert_eq!(total, records.len());

        let daily = partition(&records, Granularity::Daily);
        assert_eq!(daily.len(), 2);
        assert!(daily.values().all(|b| b.len() == 24));
    }

    #[test]
    fn test_partition_normalizes_timestamps() {
        let records = vec![ground(ts(3, 10, 15), 1), ground(ts(3, 10, 45), 2)];
        let buckets = partition(&records, Granularity::Hourly);
        let bucket = &buckets["2024-01-03/10"];

        assert_eq!(bucket.date_time, ts(3, 10, 0));
        assert!(bucket.records.iter().all(|r| r.date_time == ts(3, 10, 0)));
        // input order is kept inside a bucket
        assert_eq!(bucket.records[0].temperature, 1);
        assert_eq!(bucket.records[1].temperature, 2);
    }

    #[test]
    fn test_empty_input_has_no_buckets() {
        let records: Vec<GroundTemperature> = Vec::new();
        assert!(partition(&records, Granularity::Daily).is_empty());
        assert!(summarize(&records, Granularity::None).is_empty());
    }

    #[test]
    fn test_none_granularity_single_bucket() {
        let records = vec![ground(ts(1, 0, 0), 1), ground(ts(20, 5, 0), 3)];
        let summary = summarize(&records, Granularity::None);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].key, "");
        assert_eq!(summary[0].avg_temperature, 2.0);
    }

    #[test]
    fn test_empty_bucket_yields_zeroes() {
        let bucket: Bucket<WindMeasurement> = Bucket::new("2024-01-01", ts(1, 0, 0));
        let summary = WindMeasurement::summarize(&bucket);

        assert_eq!(summary.avg_speed, 0.0);
        assert_eq!(summary.max_gust, 0);
        assert_eq!(summary.predominant_direction, WindDirection::Unknown);

        let bucket: Bucket<AirMeasurement> = Bucket::new("2024-01-01", ts(1, 0, 0));
        let summary = AirMeasurement::summarize(&bucket);
        assert_eq!(summary.max_pressure, 0);
        assert_eq!(summary.avg_humidity, 0.0);
    }

    #[test]
    fn test_predominant_direction_majority() {
        let directions = [WindDirection::N, WindDirection::N, WindDirection::E];
        assert_eq!(predominant_direction(directions), WindDirection::N);
    }

    #[test]
    fn test_predominant_direction_tie_follows_declaration_order() {
        assert_eq!(
            predominant_direction([WindDirection::N, WindDirection::E]),
            WindDirection::N
        );
        assert_eq!(
            predominant_direction([WindDirection::E, WindDirection::N]),
            WindDirection::N
        );
        assert_eq!(
            predominant_direction([WindDirection::Unknown, WindDirection::Sw]),
            WindDirection::Sw
        );
    }

    #[test]
    fn test_predominant_direction_unknown() {
        assert_eq!(predominant_direction(Vec::new()), WindDirection::Unknown);
        assert_eq!(
            predominant_direction([WindDirection::Unknown, WindDirection::Unknown, WindDirection::W]),
            WindDirection::Unknown
        );
    }

    #[test]
    fn test_wind_summary() {
        let records = vec![
            wind(WindDirection::Nw, 4),
            wind(WindDirection::Nw, 9),
            wind(WindDirection::S, 2),
        ];
        let summary = summarize(&records, Granularity::Daily);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].avg_speed, 5.0);
        assert_eq!(summary[0].max_gust, 9);
        assert_eq!(summary[0].predominant_direction, WindDirection::Nw);
    }

    #[test]
    fn test_summary_keys_are_ordered() {
        let records = vec![
            ground(ts(2, 0, 0), 1),
            ground(ts(1, 0, 0), 1),
            ground(ts(3, 0, 0), 1),
        ];
        let keys: Vec<String> = summarize(&records, Granularity::Daily)
            .into_iter()
            .map(|s| s.key)
            .collect();

        insta::assert_snapshot!(keys.join(","), @"2024-01-01,2024-01-02,2024-01-03");
    }

    #[test]
    fn test_summary_wire_format() {
        let records = vec![Rainfall {
            date_time: ts(5, 8, 0),
            amount: 3,
        }];
        let summary = summarize(&records, Granularity::Monthly);
        let json = serde_json::to_value(&summary[0]).unwrap();

        assert_eq!(json["key"], "2024-01");
        assert_eq!(json["dateTime"], "2024-01-01T00:00:00Z");
        assert_eq!(json["maxAmount"], 3);
        assert_eq!(json["avgAmount"], 3.0);
        assert_eq!(json["minAmount"], 3);
    }
}
