use crate::analysis::AnalysisParams;
use crate::api_client::CandleSource;
use std::sync::Arc;

/// Shared, read-only handles for request handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn CandleSource>,
    pub lookback_days: i64,
    pub defaults: AnalysisParams,
}

impl AppState {
    pub fn new(source: Arc<dyn CandleSource>, lookback_days: i64, defaults: AnalysisParams) -> Self {
        Self {
            source,
            lookback_days,
            defaults,
        }
    }
}
