use super::{crossover, Signal, SignalPolicy};
use crate::indicators::{IndicatorError, SMA};
use crate::models::Sample;

/// SMA crossover: buys while the short SMA sits above the long SMA, sells while below.
/// `short_window >= long_window` is accepted; the signal is simply inverted or flat.
#[derive(Debug, Clone, Copy)]
pub struct SmaCrossover {
    short: SMA,
    long: SMA,
}

impl SmaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            short: SMA::new(short_window)?,
            long: SMA::new(long_window)?,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short.period()
    }

    pub fn long_window(&self) -> usize {
        self.long.period()
    }
}

impl SignalPolicy for SmaCrossover {
    fn generate(&self, closes: &[Sample]) -> Result<Vec<Signal>, IndicatorError> {
        let short_sma = self.short.calculate(closes);
        let long_sma = self.long.calculate(closes);
        Ok(crossover(&short_sma, &long_sma))
    }

    fn name(&self) -> &str {
        "SMA Crossover"
    }
}

pub fn sma_crossover_signals(
    closes: &[Sample],
    short_window: usize,
    long_window: usize,
) -> Result<Vec<Signal>, IndicatorError> {
    SmaCrossover::new(short_window, long_window)?.generate(closes)
}
