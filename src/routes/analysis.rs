use axum::{extract::{Query, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::{
    analysis::{tail, AnalysisParams, AnalysisRow},
    api_client::ApiError,
    services::analysis_service::{analyze_symbol, ServiceError},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub symbol: String,
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
    pub ema_span: Option<usize>,
    pub rsi_window: Option<usize>,
    pub overbought: Option<f64>,
    pub oversold: Option<f64>,
    /// Only return the most recent N rows
    pub rows: Option<usize>,
}

impl AnalysisQuery {
    fn params(&self, defaults: &AnalysisParams) -> AnalysisParams {
        AnalysisParams {
            short_window: self.short_window.unwrap_or(defaults.short_window),
            long_window: self.long_window.unwrap_or(defaults.long_window),
            ema_span: self.ema_span.unwrap_or(defaults.ema_span),
            rsi_window: self.rsi_window.unwrap_or(defaults.rsi_window),
            overbought: self.overbought.unwrap_or(defaults.overbought),
            oversold: self.oversold.unwrap_or(defaults.oversold),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub symbol: String,
    pub params: AnalysisParams,
    pub rows: Vec<AnalysisRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Indicator(_) => StatusCode::BAD_REQUEST,
        ServiceError::Api(api) => match api {
            ApiError::UnsupportedSymbol(_) | ApiError::InvalidLookback(_) => StatusCode::BAD_REQUEST,
            ApiError::SymbolNotFound(_) | ApiError::NoData(_) => StatusCode::NOT_FOUND,
            ApiError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::RequestFailed(_) | ApiError::Status { .. } | ApiError::ParseError(_) => {
                StatusCode::BAD_GATEWAY
            }
        },
    }
}

pub async fn get_analysis(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>, (StatusCode, Json<ErrorResponse>)> {
    let params = query.params(&state.defaults);

    let rows = analyze_symbol(state.source.as_ref(), &query.symbol, state.lookback_days, &params)
        .await
        .map_err(|e| {
            let status = status_for(&e);
            warn!(symbol = %query.symbol, %status, error = %e, "analysis request failed");
            (status, Json(ErrorResponse { error: e.to_string() }))
        })?;

    let rows = match query.rows {
        Some(n) => tail(&rows, n).to_vec(),
        None => rows,
    };

    Ok(Json(AnalysisResponse {
        symbol: query.symbol.trim().to_uppercase(),
        params,
        rows,
    }))
}

pub async fn health() -> &'static str {
    "ok"
}
