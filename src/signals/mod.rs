use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorError;
use crate::models::Sample;

pub mod rsi_threshold;
pub mod sma_crossover;

pub use rsi_threshold::{rsi_threshold_signals, RsiThreshold};
pub use sma_crossover::{sma_crossover_signals, SmaCrossover};

/// Core trait that all signal policies implement
pub trait SignalPolicy: Send + Sync {
    /// Maps a closing-price series to one signal per price
    fn generate(&self, closes: &[Sample]) -> Result<Vec<Signal>, IndicatorError>;

    /// Policy display name
    fn name(&self) -> &str;
}

/// Decision derived from indicator values at one index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    /// Also used where the indicator is not yet defined
    #[default]
    Hold,
}

impl Signal {
    /// Conventional numeric encoding: buy 1, sell -1, hold 0
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Hold => 0,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.pad(label)
    }
}

/// Buy where `short` is strictly above `long`, sell where strictly below.
/// Both series are expected to be index-aligned; the output has the length of
/// the shorter one.
pub fn crossover(short: &[Sample], long: &[Sample]) -> Vec<Signal> {
    short
        .iter()
        .zip(long)
        .map(|(s, l)| match (s, l) {
            (Some(s), Some(l)) if s > l => Signal::Buy,
            (Some(s), Some(l)) if s < l => Signal::Sell,
            _ => Signal::Hold,
        })
        .collect()
}

/// Buy strictly below `oversold`, sell strictly above `overbought`.
/// Values exactly on a level hold.
pub fn threshold(values: &[Sample], overbought: f64, oversold: f64) -> Vec<Signal> {
    values
        .iter()
        .map(|value| match value {
            Some(v) if *v < oversold => Signal::Buy,
            Some(v) if *v > overbought => Signal::Sell,
            _ => Signal::Hold,
        })
        .collect()
}
