//! Zone Ranking
//!
//! Per-zone averages over the resampled window, highest first.

use std::cmp::Ordering;

use serde::Serialize;

use crate::resample::ResampledSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneAverage {
    pub zone: String,
    pub average: Option<f64>,
}

/// All zones sorted by average, descending; zones without data sort last
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ZoneRanking {
    entries: Vec<ZoneAverage>,
}

fn compare_desc(a: &ZoneAverage, b: &ZoneAverage) -> Ordering {
    match (a.average, b.average) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Ascending, zones without data still last
fn compare_asc(a: &ZoneAverage, b: &ZoneAverage) -> Ordering {
    match (a.average, b.average) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl ZoneRanking {
    /// Rank every zone of `series` by the mean of its bucket values
    pub fn from_series(series: &ResampledSeries) -> Self {
        let mut entries: Vec<ZoneAverage> = series
            .zones()
            .iter()
            .enumerate()
            .map(|(index, zone)| {
                let (sum, count) = series
                    .buckets()
                    .iter()
                    .filter_map(|b| b.value(index))
                    .fold((0.0, 0_usize), |(s, c), v| (s + v, c + 1));
                ZoneAverage {
                    zone: zone.clone(),
                    average: (count > 0).then(|| sum / count as f64),
                }
            })
            .collect();

        // Stable, so ties keep dataset order
        entries.sort_by(compare_desc);
        Self { entries }
    }

    pub fn entries(&self) -> &[ZoneAverage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest `n` zones, highest first
    pub fn top(&self, n: usize) -> Vec<ZoneAverage> {
        self.entries.iter().take(n).cloned().collect()
    }

    /// Last `n` entries of the ranking, re-sorted lowest first
    ///
    /// Zones without data stay at the end.
    pub fn bottom(&self, n: usize) -> Vec<ZoneAverage> {
        let skip = self.entries.len().saturating_sub(n);
        let mut tail: Vec<ZoneAverage> = self.entries[skip..].to_vec();
        tail.sort_by(compare_asc);
        tail
    }
}
