use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a price or indicator series. `None` marks a missing value.
pub type Sample = Option<f64>;

/// Daily OHLCV bar. Fields are `None` when the provider had no value for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl Bar {
    /// A bar whose retrieval failed: every field is missing.
    pub fn missing(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        }
    }
}

/// Closing prices of `bars`, index-aligned.
pub fn closes(bars: &[Bar]) -> Vec<Sample> {
    bars.iter().map(|b| b.close).collect()
}

/// Treats non-finite values as missing.
pub(crate) fn finite(sample: Sample) -> Sample {
    sample.filter(|v| v.is_finite())
}
