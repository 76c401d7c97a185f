//! Resampler
//!
//! Fixed-width bucketing with per-zone arithmetic means.
//!
//! Buckets are half-open `[start, start + width)` and aligned to the Unix
//! epoch of the naive timestamp, so daily buckets start at midnight and
//! hourly buckets at the top of the hour. Missing values are left out of both
//! sum and count; a bucket where a zone has no value yields `None` for that
//! zone, and a bucket with no records at all is not emitted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Record;
use crate::error::ModelError;

/// Supported bucket widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResampleRule {
    #[serde(rename = "5T", alias = "5min", alias = "5m")]
    FiveMinutes,
    #[serde(rename = "15T", alias = "15min", alias = "15m")]
    FifteenMinutes,
    #[serde(rename = "30T", alias = "30min", alias = "30m")]
    ThirtyMinutes,
    #[default]
    #[serde(rename = "1H", alias = "1h", alias = "hourly")]
    Hourly,
    #[serde(rename = "6H", alias = "6h")]
    SixHours,
    #[serde(rename = "1D", alias = "1d", alias = "daily")]
    Daily,
}

impl ResampleRule {
    /// All rules, finest first
    pub const ALL: [ResampleRule; 6] = [
        ResampleRule::FiveMinutes,
        ResampleRule::FifteenMinutes,
        ResampleRule::ThirtyMinutes,
        ResampleRule::Hourly,
        ResampleRule::SixHours,
        ResampleRule::Daily,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResampleRule::FiveMinutes => "5T",
            ResampleRule::FifteenMinutes => "15T",
            ResampleRule::ThirtyMinutes => "30T",
            ResampleRule::Hourly => "1H",
            ResampleRule::SixHours => "6H",
            ResampleRule::Daily => "1D",
        }
    }

    pub fn width_seconds(&self) -> i64 {
        match self {
            ResampleRule::FiveMinutes => 5 * 60,
            ResampleRule::FifteenMinutes => 15 * 60,
            ResampleRule::ThirtyMinutes => 30 * 60,
            ResampleRule::Hourly => 3600,
            ResampleRule::SixHours => 6 * 3600,
            ResampleRule::Daily => 86_400,
        }
    }

    pub fn width(&self) -> Duration {
        Duration::seconds(self.width_seconds())
    }

    /// Start of the bucket containing `timestamp`
    pub fn bucket_start(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let width = self.width_seconds();
        let offset = timestamp.and_utc().timestamp().rem_euclid(width);
        timestamp
            - Duration::seconds(offset)
            - Duration::nanoseconds(i64::from(timestamp.nanosecond()))
    }
}

impl fmt::Display for ResampleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResampleRule {
    type Err = ModelError;

    /// Case-insensitive; accepts the `5T`-style labels and `5min`/`1h`/`1d` aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5t" | "5min" | "5m" => Ok(ResampleRule::FiveMinutes),
            "15t" | "15min" | "15m" => Ok(ResampleRule::FifteenMinutes),
            "30t" | "30min" | "30m" => Ok(ResampleRule::ThirtyMinutes),
            "1h" | "60min" | "hourly" => Ok(ResampleRule::Hourly),
            "6h" => Ok(ResampleRule::SixHours),
            "1d" | "24h" | "daily" => Ok(ResampleRule::Daily),
            _ => Err(ModelError::validation(format!(
                "Unknown resample rule '{}'. Valid rules: 5T, 15T, 30T, 1H, 6H, 1D",
                s
            ))),
        }
    }
}

/// One long-form trend row: `(timestamp, zone, value)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub zone: String,
    pub value: Option<f64>,
}

/// Bucketed series; each bucket is a [`Record`] stamped with its bucket start
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResampledSeries {
    rule: ResampleRule,
    zones: Vec<String>,
    buckets: Vec<Record>,
}

impl ResampledSeries {
    pub fn rule(&self) -> ResampleRule {
        self.rule
    }

    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    /// Non-empty buckets in ascending order
    pub fn buckets(&self) -> &[Record] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn zone_index(&self, name: &str) -> Option<usize> {
        self.zones.iter().position(|z| z == name)
    }

    /// `(bucket start, mean)` pairs for one zone
    pub fn zone_values(&self, name: &str) -> Option<Vec<(NaiveDateTime, Option<f64>)>> {
        let index = self.zone_index(name)?;
        Some(
            self.buckets
                .iter()
                .map(|b| (b.timestamp, b.value(index)))
                .collect(),
        )
    }

    /// Buckets as plain records, e.g. to resample again
    pub fn into_records(self) -> Vec<Record> {
        self.buckets
    }

    /// Long-form rows for `selection`, zone by zone in selection order
    ///
    /// Names that are not zones of this series are skipped.
    pub fn long_form(&self, selection: &[String]) -> Vec<TrendPoint> {
        selection
            .iter()
            .filter_map(|zone| Some((zone, self.zone_index(zone)?)))
            .flat_map(|(zone, index)| {
                self.buckets.iter().map(move |bucket| TrendPoint {
                    timestamp: bucket.timestamp,
                    zone: zone.clone(),
                    value: bucket.value(index),
                })
            })
            .collect()
    }
}

#[derive(Clone)]
struct BucketAccumulator {
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl BucketAccumulator {
    fn new(width: usize) -> Self {
        Self {
            sums: vec![0.0; width],
            counts: vec![0; width],
        }
    }

    fn add(&mut self, record: &Record) {
        for (index, value) in record.values().iter().enumerate() {
            if let (Some(value), Some(sum)) = (value, self.sums.get_mut(index)) {
                *sum += value;
                self.counts[index] += 1;
            }
        }
    }

    fn means(&self) -> Vec<Option<f64>> {
        self.sums
            .iter()
            .zip(&self.counts)
            .map(|(&sum, &count)| (count > 0).then(|| sum / count as f64))
            .collect()
    }
}

/// Bucket-mean resampler
#[derive(Clone, Copy, Debug, Default)]
pub struct Resampler;

impl Resampler {
    pub fn new() -> Self {
        Self
    }

    /// Bucket `records` at `rule` and average each zone per bucket
    ///
    /// # Arguments
    /// * `records` - Records to bucket; order does not matter
    /// * `zones` - Zone names, positionally matching each record's values
    /// * `rule` - Bucket width
    pub fn resample(&self, records: &[Record], zones: &[String], rule: ResampleRule) -> ResampledSeries {
        let mut buckets: BTreeMap<NaiveDateTime, BucketAccumulator> = BTreeMap::new();

        for record in records {
            buckets
                .entry(rule.bucket_start(record.timestamp))
                .or_insert_with(|| BucketAccumulator::new(zones.len()))
                .add(record);
        }

        debug!(
            "Resampled {} records into {} buckets at {}",
            records.len(),
            buckets.len(),
            rule
        );

        ResampledSeries {
            rule,
            zones: zones.to_vec(),
            buckets: buckets
                .into_iter()
                .map(|(start, acc)| Record::new(start, acc.means()))
                .collect(),
        }
    }
}
