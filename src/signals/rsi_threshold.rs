use super::{threshold, Signal, SignalPolicy};
use crate::indicators::{IndicatorError, RSI};
use crate::models::Sample;

/// RSI threshold: buys when oversold, sells when overbought.
/// The levels are used as given; `oversold < overbought` is the caller's concern.
#[derive(Debug, Clone, Copy)]
pub struct RsiThreshold {
    rsi: RSI,
    overbought: f64,
    oversold: f64,
}

impl RsiThreshold {
    pub fn new(window: usize, overbought: f64, oversold: f64) -> Result<Self, IndicatorError> {
        Ok(Self {
            rsi: RSI::new(window)?,
            overbought,
            oversold,
        })
    }

    pub fn window(&self) -> usize {
        self.rsi.period()
    }

    pub fn levels(&self) -> (f64, f64) {
        (self.overbought, self.oversold)
    }
}

impl SignalPolicy for RsiThreshold {
    fn generate(&self, closes: &[Sample]) -> Result<Vec<Signal>, IndicatorError> {
        let rsi = self.rsi.calculate(closes);
        Ok(threshold(&rsi, self.overbought, self.oversold))
    }

    fn name(&self) -> &str {
        "RSI Threshold"
    }
}

pub fn rsi_threshold_signals(
    closes: &[Sample],
    window: usize,
    overbought: f64,
    oversold: f64,
) -> Result<Vec<Signal>, IndicatorError> {
    RsiThreshold::new(window, overbought, oversold)?.generate(closes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<Sample> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_oversold_buys() {
        // Window changes -1, -1, -1, +1: RSI = 25
        let closes = series(&[13.0, 12.0, 11.0, 10.0, 11.0]);
        let signals = rsi_threshold_signals(&closes, 4, 70.0, 30.0).unwrap();

        assert_eq!(signals[4], Signal::Buy);
        assert!(signals[..4].iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn test_overbought_sells() {
        // Window changes +1, +1, +1, -1: RSI = 75
        let closes = series(&[10.0, 11.0, 12.0, 13.0, 12.0]);
        let signals = rsi_threshold_signals(&closes, 4, 70.0, 30.0).unwrap();

        assert_eq!(signals[4], Signal::Sell);
    }

    #[test]
    fn test_neutral_holds() {
        // +1, -1: RSI = 50
        let closes = series(&[10.0, 11.0, 10.0]);
        let signals = rsi_threshold_signals(&closes, 2, 70.0, 30.0).unwrap();

        assert_eq!(signals, vec![Signal::Hold; 3]);
    }

    #[test]
    fn test_exact_level_holds() {
        // RSI is exactly 75 on the way up, about 25 on the way down
        let up = series(&[10.0, 11.0, 12.0, 13.0, 12.0]);
        let down = series(&[13.0, 12.0, 11.0, 10.0, 11.0]);
        let policy = RsiThreshold::new(4, 75.0, 20.0).unwrap();

        assert_eq!(policy.generate(&up).unwrap()[4], Signal::Hold);
        assert_eq!(
            RsiThreshold::new(4, 80.0, 25.0).unwrap().generate(&up).unwrap()[4],
            Signal::Hold
        );
        // 25 is not strictly below an oversold level of 20
        assert_eq!(policy.generate(&down).unwrap()[4], Signal::Hold);
    }

    #[test]
    fn test_flat_prices_hold() {
        let closes = series(&[100.0; 30]);
        let signals = rsi_threshold_signals(&closes, 14, 70.0, 30.0).unwrap();
        assert!(signals.iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn test_pure_gains_sell() {
        let closes: Vec<Sample> = (0..20).map(|i| Some(50.0 + i as f64)).collect();
        let signals = rsi_threshold_signals(&closes, 14, 70.0, 30.0).unwrap();

        assert!(signals[..14].iter().all(|s| *s == Signal::Hold));
        assert!(signals[14..].iter().all(|s| *s == Signal::Sell));
    }

    #[test]
    fn test_unordered_levels_not_validated() {
        // oversold above overbought: every defined value is both, buy is checked first
        let closes = series(&[10.0, 11.0, 10.0]);
        let signals = rsi_threshold_signals(&closes, 2, 30.0, 70.0).unwrap();
        assert_eq!(signals[2], Signal::Buy);
    }

    #[test]
    fn test_invalid_window_rejected() {
        assert_eq!(
            rsi_threshold_signals(&[], 0, 70.0, 30.0),
            Err(IndicatorError::InvalidPeriod { indicator: "RSI", period: 0 })
        );
    }

    #[test]
    fn test_policy_metadata() {
        let policy = RsiThreshold::new(14, 70.0, 30.0).unwrap();
        assert_eq!(policy.name(), "RSI Threshold");
        assert_eq!(policy.window(), 14);
        assert_eq!(policy.levels(), (70.0, 30.0));
    }
}
