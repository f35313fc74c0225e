use super::IndicatorError;
use crate::models::{finite, Sample};

/// Simple Moving Average (SMA)
/// Calculates the arithmetic mean of the last N prices
#[derive(Debug, Clone, Copy)]
pub struct SMA {
    period: usize,
}

impl SMA {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let period = IndicatorError::check_period("SMA", period)?;
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Calculate SMA for a price series
    /// Returns a vector of the same length as input
    /// First (period - 1) values are missing (warmup period), as is any
    /// window that contains a missing price
    pub fn calculate(&self, prices: &[Sample]) -> Vec<Sample> {
        let mut result = vec![None; prices.len()];

        if prices.len() < self.period {
            return result;
        }

        // Each window is summed directly so an all-zero window is exactly zero
        for i in (self.period - 1)..prices.len() {
            let window_start = i + 1 - self.period;
            let window = &prices[window_start..=i];
            let sum: Option<f64> = window.iter().map(|p| finite(*p)).sum();
            result[i] = sum.map(|s| s / self.period as f64);
        }

        result
    }
}

/// Exponential Moving Average (EMA)
/// Gives more weight to recent prices using exponential smoothing
#[derive(Debug, Clone, Copy)]
pub struct EMA {
    span: usize,
}

impl EMA {
    pub fn new(span: usize) -> Result<Self, IndicatorError> {
        let span = IndicatorError::check_period("EMA", span)?;
        Ok(Self { span })
    }

    pub fn span(&self) -> usize {
        self.span
    }

    /// Smoothing factor (alpha) for EMA calculation
    /// alpha = 2 / (span + 1)
    pub fn smoothing_factor(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }

    /// Calculate EMA for a price series
    /// Returns a vector of the same length as input
    /// Seeded with the first price, so there is no warmup period.
    /// A missing price gives a missing EMA and the next price re-seeds it.
    pub fn calculate(&self, prices: &[Sample]) -> Vec<Sample> {
        let alpha = self.smoothing_factor();
        let mut result = Vec::with_capacity(prices.len());
        let mut prev: Sample = None;

        // EMA(t) = Price(t) * alpha + EMA(t-1) * (1 - alpha)
        for price in prices {
            let value = match (finite(*price), prev) {
                (Some(p), Some(prev_ema)) => Some(p * alpha + prev_ema * (1.0 - alpha)),
                (Some(p), None) => Some(p),
                (None, _) => None,
            };
            result.push(value);
            prev = value;
        }

        result
    }
}
