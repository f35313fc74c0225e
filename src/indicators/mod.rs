// Technical indicators module
// Every calculation maps a series to a series of the same length

pub mod moving_averages;
pub mod rsi;

use thiserror::Error;

use crate::models::Sample;

pub use moving_averages::{SMA, EMA};
pub use rsi::RSI;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("{indicator} period must be positive, got {period}")]
    InvalidPeriod { indicator: &'static str, period: usize },
}

impl IndicatorError {
    pub(crate) fn check_period(indicator: &'static str, period: usize) -> Result<usize, Self> {
        if period == 0 {
            Err(IndicatorError::InvalidPeriod { indicator, period })
        } else {
            Ok(period)
        }
    }
}

pub fn simple_moving_average(series: &[Sample], window: usize) -> Result<Vec<Sample>, IndicatorError> {
    Ok(SMA::new(window)?.calculate(series))
}

pub fn exponential_moving_average(series: &[Sample], span: usize) -> Result<Vec<Sample>, IndicatorError> {
    Ok(EMA::new(span)?.calculate(series))
}

pub fn relative_strength_index(series: &[Sample], window: usize) -> Result<Vec<Sample>, IndicatorError> {
    Ok(RSI::new(window)?.calculate(series))
}
