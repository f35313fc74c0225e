//! Daily OHLCV analysis: SMA/EMA/RSI indicators and the buy/sell/hold signals
//! derived from them, plus the Finnhub fetcher and HTTP surface around them.
//!
//! `indicators`, `signals` and `analysis` are pure and synchronous; every
//! output series has the length and ordering of its input.

pub mod analysis;
pub mod api_client;
pub mod config;
pub mod indicators;
pub mod models;
pub mod routes;
pub mod services;
pub mod signals;
pub mod state;

pub use analysis::{analyze, AnalysisParams, AnalysisRow};
pub use indicators::{
    exponential_moving_average, relative_strength_index, simple_moving_average, IndicatorError,
};
pub use models::{Bar, Sample};
pub use signals::{rsi_threshold_signals, sma_crossover_signals, Signal, SignalPolicy};
