use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl TimeRange {
    /// The `minutes` minutes leading up to now.
    pub fn last_minutes(minutes: i64) -> Self {
        Self::last_minutes_before(Utc::now(), minutes)
    }

    pub fn last_minutes_before(end_time: DateTime<Utc>, minutes: i64) -> Self {
        Self {
            start_time: end_time - Duration::minutes(minutes),
            end_time,
        }
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start_time <= time && time <= self.end_time
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::last_minutes(10)
    }
}

/// What to fetch: an optional time window, the page size, and filters the
/// fetcher interprets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListFilter<V> {
    pub time_range: Option<TimeRange>,
    pub page_size: usize,
    pub value_filters: V,
}

impl<V> ListFilter<V> {
    pub fn new(page_size: usize, value_filters: V) -> Self {
        Self {
            time_range: None,
            page_size,
            value_filters,
        }
    }

    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }
}
