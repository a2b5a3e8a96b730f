//! Grouping key function
//!
//! Maps a timestamp and a granularity to the identity of the window the
//! timestamp falls into and to that window's representative timestamp.
//! Both are derived from the same truncation, so two timestamps share a key
//! exactly when they share a rounded timestamp.

use crate::types::{Granularity, Timestamp};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};

/// Bucket identity plus the canonical start of the bucket's window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub key: String,
    pub date_time: Timestamp,
}

impl GroupKey {
    pub fn new(timestamp: Timestamp, granularity: Granularity) -> Self {
        let date_time = rounded_timestamp(timestamp, granularity);
        Self {
            key: bucket_key(date_time, granularity),
            date_time,
        }
    }
}

/// Bucket identity string: `YYYY-MM-DD/HH`, `YYYY-MM-DD`, `YYYY-MM`, or empty
pub fn bucket_key(timestamp: Timestamp, granularity: Granularity) -> String {
    match granularity {
        Granularity::Hourly => timestamp.format("%Y-%m-%d/%H").to_string(),
        Granularity::Daily => timestamp.format("%Y-%m-%d").to_string(),
        Granularity::Monthly => timestamp.format("%Y-%m").to_string(),
        Granularity::None => String::new(),
    }
}

/// Start of the window `timestamp` falls into, using the UTC calendar fields
pub fn rounded_timestamp(timestamp: Timestamp, granularity: Granularity) -> Timestamp {
    let date = timestamp.date_naive();
    let truncated: Option<NaiveDateTime> = match granularity {
        Granularity::Hourly => date.and_hms_opt(timestamp.hour(), 0, 0),
        Granularity::Daily => date.and_hms_opt(0, 0, 0),
        Granularity::Monthly => date.with_day(1).and_then(|first| first.and_hms_opt(0, 0, 0)),
        Granularity::None => return timestamp,
    };

    // Every valid date has a midnight and a top of the hour in UTC.
    truncated
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
        .unwrap_or(timestamp)
}
