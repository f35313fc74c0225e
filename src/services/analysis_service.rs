use crate::analysis::{analyze, AnalysisParams, AnalysisRow};
use crate::api_client::{ApiError, CandleSource, Instrument};
use crate::indicators::IndicatorError;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Fetch daily bars for `symbol` and compute the full indicator/signal bundle
#[instrument(skip(source, params))]
pub async fn analyze_symbol(
    source: &dyn CandleSource,
    symbol: &str,
    lookback_days: i64,
    params: &AnalysisParams,
) -> Result<Vec<AnalysisRow>, ServiceError> {
    let instrument = Instrument::parse(symbol)?;

    // Validate windows before spending a request
    params.validate()?;

    let bars = source.daily_bars(&instrument, lookback_days).await?;
    if bars.is_empty() {
        return Err(ApiError::NoData(instrument.to_string()).into());
    }

    let rows = analyze(&bars, params)?;
    if let Some(last) = rows.last() {
        info!(
            %instrument,
            bars = rows.len(),
            sma_signal = %last.sma_signal,
            rsi_signal = %last.rsi_signal,
            "analysis complete"
        );
    }
    Ok(rows)
}
