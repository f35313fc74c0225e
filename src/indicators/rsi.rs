use super::{IndicatorError, SMA};
use crate::models::{finite, Sample};

/// Relative Strength Index (RSI)
/// Measures momentum by comparing magnitude of recent gains to recent losses
/// Returns values between 0-100:
/// - Below 30: Oversold (potentially undervalued)
/// - Above 70: Overbought (potentially overvalued)
#[derive(Debug, Clone, Copy)]
pub struct RSI {
    period: usize,
    averaging: SMA,
}

impl RSI {
    /// Value reported for a flat run (no gains and no losses in the window)
    pub const NEUTRAL: f64 = 50.0;

    /// Value reported when the window has gains but no losses
    pub const MAX: f64 = 100.0;

    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let period = IndicatorError::check_period("RSI", period)?;
        Ok(Self {
            period,
            averaging: SMA::new(period)?,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Calculate RSI for a price series using simple rolling means of gains and losses
    /// Returns a vector of the same length as input
    /// First (period) values are missing: the first price has no change
    pub fn calculate(&self, prices: &[Sample]) -> Vec<Sample> {
        let mut gains = Vec::with_capacity(prices.len());
        let mut losses = Vec::with_capacity(prices.len());

        for i in 0..prices.len() {
            let change = match i {
                0 => None,
                _ => match (finite(prices[i]), finite(prices[i - 1])) {
                    (Some(current), Some(previous)) => Some(current - previous),
                    _ => None,
                },
            };
            gains.push(change.map(|c| if c > 0.0 { c } else { 0.0 }));
            losses.push(change.map(|c| if c < 0.0 { -c } else { 0.0 }));
        }

        let avg_gains = self.averaging.calculate(&gains);
        let avg_losses = self.averaging.calculate(&losses);

        avg_gains
            .into_iter()
            .zip(avg_losses)
            .map(|(gain, loss)| Some(Self::compute_rsi(gain?, loss?)))
            .collect()
    }

    fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            // RS is infinite (pure gains) or 0/0 (flat)
            if avg_gain == 0.0 {
                Self::NEUTRAL
            } else {
                Self::MAX
            }
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        }
    }
}
