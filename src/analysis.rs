use serde::{Deserialize, Serialize};

use crate::indicators::{IndicatorError, EMA, RSI, SMA};
use crate::models::{closes, Bar, Sample};
use crate::signals::{crossover, threshold, Signal};

/// Number of rows shown by default when presenting an analysis
pub const DEFAULT_TAIL_ROWS: usize = 10;

/// Indicator windows and signal levels used to build an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub short_window: usize,
    pub long_window: usize,
    pub ema_span: usize,
    pub rsi_window: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
            ema_span: 12,
            rsi_window: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl AnalysisParams {
    /// Checks every window without computing anything
    pub fn validate(&self) -> Result<(), IndicatorError> {
        self.indicators().map(|_| ())
    }

    fn indicators(&self) -> Result<(SMA, SMA, EMA, RSI), IndicatorError> {
        Ok((
            SMA::new(self.short_window)?,
            SMA::new(self.long_window)?,
            EMA::new(self.ema_span)?,
            RSI::new(self.rsi_window)?,
        ))
    }
}

/// One input bar with every indicator and signal computed at its index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    #[serde(flatten)]
    pub bar: Bar,
    pub sma_short: Sample,
    pub sma_long: Sample,
    pub ema: Sample,
    pub rsi: Sample,
    pub sma_signal: Signal,
    pub rsi_signal: Signal,
}

/// Computes indicators and signals for every bar, preserving order and length.
/// All windows are validated before anything is computed.
pub fn analyze(bars: &[Bar], params: &AnalysisParams) -> Result<Vec<AnalysisRow>, IndicatorError> {
    let (short, long, ema, rsi) = params.indicators()?;

    let closes = closes(bars);
    let sma_short = short.calculate(&closes);
    let sma_long = long.calculate(&closes);
    let ema = ema.calculate(&closes);
    let rsi = rsi.calculate(&closes);

    let sma_signals = crossover(&sma_short, &sma_long);
    let rsi_signals = threshold(&rsi, params.overbought, params.oversold);

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| AnalysisRow {
            bar: bar.clone(),
            sma_short: sma_short[i],
            sma_long: sma_long[i],
            ema: ema[i],
            rsi: rsi[i],
            sma_signal: sma_signals[i],
            rsi_signal: rsi_signals[i],
        })
        .collect();

    Ok(rows)
}

/// The last `min(n, len)` rows
pub fn tail(rows: &[AnalysisRow], n: usize) -> &[AnalysisRow] {
    &rows[rows.len().saturating_sub(n)..]
}
