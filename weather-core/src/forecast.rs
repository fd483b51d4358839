//! Daily reduction of the 3-hourly upstream forecast series.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde_json::Value;

use crate::model::{DailyForecast, ForecastSample};

/// Current day plus the three following ones.
pub const DEFAULT_FORECAST_DAYS: usize = 4;

/// A forecast entry carrying its epoch-seconds timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> Option<i64>;
}

impl Timestamped for ForecastSample {
    fn timestamp(&self) -> Option<i64> {
        Some(self.dt)
    }
}

/// Raw upstream entry; the timestamp is its integer `dt` field.
impl Timestamped for Value {
    fn timestamp(&self) -> Option<i64> {
        self.get("dt").and_then(Value::as_i64)
    }
}

/// Buckets forecast samples by calendar day.
///
/// Walks the input in order and keeps a sample whenever its day differs from
/// the day of the previously kept sample, until `max_days` days are held.
/// The input is never sorted, so same-day samples are expected to be
/// contiguous, which holds for the time-ordered upstream feed.
#[derive(Debug, Clone, Copy)]
pub struct DailyAggregator {
    max_days: usize,
    offset: FixedOffset,
}

impl Default for DailyAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_FORECAST_DAYS)
    }
}

impl DailyAggregator {
    /// Aggregator deriving day-keys in UTC.
    pub fn new(max_days: usize) -> Self {
        Self {
            max_days,
            offset: Utc.fix(),
        }
    }

    /// Derive day-keys in a fixed offset instead of UTC.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Calendar date of `dt` in this aggregator's offset.
    pub fn day_key(&self, dt: i64) -> Option<NaiveDate> {
        DateTime::from_timestamp(dt, 0).map(|ts| ts.with_timezone(&self.offset).date_naive())
    }

    /// Entries without a usable timestamp are skipped.
    pub fn aggregate<S, I>(&self, samples: I) -> DailyForecast<S>
    where
        S: Timestamped,
        I: IntoIterator<Item = S>,
    {
        let mut days: Vec<(NaiveDate, S)> = Vec::with_capacity(self.max_days);
        let mut current_day: Option<NaiveDate> = None;

        for sample in samples {
            let dt = sample.timestamp();
            let Some(day) = dt.and_then(|dt| self.day_key(dt)) else {
                tracing::debug!(?dt, "skipping forecast sample without a usable timestamp");
                continue;
            };

            if current_day == Some(day) || days.len() >= self.max_days {
                continue;
            }
            current_day = Some(day);

            // A day seen again after another day replaces its earlier entry in place.
            match days.iter_mut().find(|(key, _)| *key == day) {
                Some(slot) => slot.1 = sample,
                None => days.push((day, sample)),
            }
        }

        DailyForecast::from_samples(days.into_iter().map(|(_, sample)| sample).collect())
    }
}
