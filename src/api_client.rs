use crate::models::Bar;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Exchange whose symbol list is searched for crypto pairs
const CRYPTO_EXCHANGE: &str = "binance";

/// Forex quotes are rounded to this many decimals
const FOREX_DECIMALS: i32 = 5;

/// Longest candle history a single request may ask for
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Header carrying the API key, so it never appears in request URLs
const TOKEN_HEADER: &str = "X-Finnhub-Token";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unsupported symbol: {0:?}")]
    UnsupportedSymbol(String),
    #[error("no matching symbol found for {0}")]
    SymbolNotFound(String),
    #[error("FINNHUB_API_KEY is not set")]
    MissingApiKey,
    #[error("lookback must be between 1 and {max} days, got {0}", max = MAX_LOOKBACK_DAYS)]
    InvalidLookback(i64),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("no data available: {0}")]
    NoData(String),
}

/// Instrument class, derived from the symbol's format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instrument {
    /// `BTC-USDT`
    Crypto { base: String, quote: String },
    /// `EUR/USD`
    Forex { base: String, quote: String },
    /// `AAPL`, `BRK.B`
    Equity { ticker: String },
}

impl Instrument {
    pub fn parse(symbol: &str) -> Result<Self, ApiError> {
        let normalized = symbol.trim().to_uppercase();
        let unsupported = || ApiError::UnsupportedSymbol(symbol.to_string());
        let is_code = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());

        if let Some((base, quote)) = normalized.split_once('-') {
            if !is_code(base) || !is_code(quote) {
                return Err(unsupported());
            }
            return Ok(Instrument::Crypto {
                base: base.to_string(),
                quote: quote.to_string(),
            });
        }

        if let Some((base, quote)) = normalized.split_once('/') {
            if !is_code(base) || !is_code(quote) {
                return Err(unsupported());
            }
            return Ok(Instrument::Forex {
                base: base.to_string(),
                quote: quote.to_string(),
            });
        }

        let valid_ticker = !normalized.is_empty()
            && normalized.chars().any(|c| c.is_ascii_alphanumeric())
            && normalized.chars().all(|c| c.is_ascii_alphanumeric() || c == '.');
        if !valid_ticker {
            return Err(unsupported());
        }
        Ok(Instrument::Equity { ticker: normalized })
    }

    fn candle_path(&self) -> &'static str {
        match self {
            Instrument::Crypto { .. } => "crypto/candle",
            Instrument::Forex { .. } => "forex/candle",
            Instrument::Equity { .. } => "stock/candle",
        }
    }

    fn price_decimals(&self) -> Option<i32> {
        match self {
            Instrument::Forex { .. } => Some(FOREX_DECIMALS),
            _ => None,
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instrument::Crypto { base, quote } => write!(f, "{}-{}", base, quote),
            Instrument::Forex { base, quote } => write!(f, "{}/{}", base, quote),
            Instrument::Equity { ticker } => write!(f, "{}", ticker),
        }
    }
}

/// Source of daily bars, ascending by timestamp with no duplicates
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn daily_bars(&self, instrument: &Instrument, lookback_days: i64) -> Result<Vec<Bar>, ApiError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct CryptoSymbol {
    pub symbol: String,
    #[serde(rename = "displaySymbol")]
    pub display_symbol: String,
    #[serde(default)]
    pub description: String,
}

/// Columnar candle payload: one entry per bar in each column
#[derive(Debug, Deserialize)]
struct CandleResponse {
    #[serde(default)]
    s: String,
    #[serde(default)]
    o: Vec<Option<f64>>,
    #[serde(default)]
    h: Vec<Option<f64>>,
    #[serde(default)]
    l: Vec<Option<f64>>,
    #[serde(default)]
    c: Vec<Option<f64>>,
    #[serde(default)]
    v: Vec<Option<f64>>,
    #[serde(default)]
    t: Vec<i64>,
    #[serde(default)]
    error: Option<String>,
}

impl CandleResponse {
    fn into_bars(self, price_decimals: Option<i32>) -> Result<Vec<Bar>, ApiError> {
        if self.s != "ok" {
            let reason = self.error.unwrap_or_else(|| format!("status {:?}", self.s));
            return Err(ApiError::NoData(reason));
        }

        let len = self.t.len();
        for (name, column) in [("o", &self.o), ("h", &self.h), ("l", &self.l), ("c", &self.c), ("v", &self.v)] {
            if column.len() != len {
                return Err(ApiError::ParseError(format!(
                    "column {} has {} entries, expected {}",
                    name,
                    column.len(),
                    len
                )));
            }
        }

        let price = |value: Option<f64>| match price_decimals {
            Some(decimals) => value.map(|v| round_to(v, decimals)),
            None => value,
        };

        let mut bars = Vec::with_capacity(len);
        for i in 0..len {
            let timestamp = DateTime::from_timestamp(self.t[i], 0)
                .ok_or_else(|| ApiError::ParseError(format!("invalid timestamp {}", self.t[i])))?;
            bars.push(Bar {
                timestamp,
                open: price(self.o[i]),
                high: price(self.h[i]),
                low: price(self.l[i]),
                close: price(self.c[i]),
                volume: self.v[i],
            });
        }

        // Sort by timestamp (ascending); a repeated timestamp keeps the later row
        bars.sort_by_key(|b| b.timestamp);
        let mut unique: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match unique.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => unique.push(bar),
            }
        }

        if unique.is_empty() {
            return Err(ApiError::NoData("empty candle set".to_string()));
        }
        Ok(unique)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn find_matching_symbol<'a>(symbols: &'a [CryptoSymbol], base: &str, quote: &str) -> Option<&'a CryptoSymbol> {
    let display = format!("{}/{}", base, quote);
    symbols
        .iter()
        .find(|s| s.display_symbol.eq_ignore_ascii_case(&display))
}

/// Start of a `lookback_days` window ending at `end`
fn lookback_start(end: DateTime<Utc>, lookback_days: i64) -> Result<DateTime<Utc>, ApiError> {
    if !(1..=MAX_LOOKBACK_DAYS).contains(&lookback_days) {
        return Err(ApiError::InvalidLookback(lookback_days));
    }
    Duration::try_days(lookback_days)
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or(ApiError::InvalidLookback(lookback_days))
}

pub struct FinnhubClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl FinnhubClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let token = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header(TOKEN_HEADER, token)
            .header("User-Agent", "market-signals/0.1")
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.without_url().to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ApiError::RequestFailed(format!("failed to read response body: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response_text,
            });
        }

        serde_json::from_str(&response_text)
            .map_err(|e| ApiError::ParseError(format!("{} from {}: {}", e, path, response_text)))
    }

    pub async fn crypto_symbols(&self) -> Result<Vec<CryptoSymbol>, ApiError> {
        self.get_json("crypto/symbol", &[("exchange", CRYPTO_EXCHANGE.to_string())])
            .await
    }

    /// Provider-side symbol for an instrument
    pub async fn resolve_symbol(&self, instrument: &Instrument) -> Result<String, ApiError> {
        match instrument {
            Instrument::Crypto { base, quote } => {
                let symbols = self.crypto_symbols().await?;
                debug!(count = symbols.len(), "fetched crypto symbol list");
                let matched = find_matching_symbol(&symbols, base, quote)
                    .ok_or_else(|| ApiError::SymbolNotFound(instrument.to_string()))?;
                debug!(symbol = %matched.symbol, description = %matched.description, "resolved crypto pair");
                Ok(matched.symbol.clone())
            }
            Instrument::Forex { base, quote } => Ok(format!("OANDA:{}_{}", base, quote)),
            Instrument::Equity { ticker } => Ok(ticker.clone()),
        }
    }
}

#[async_trait]
impl CandleSource for FinnhubClient {
    async fn daily_bars(&self, instrument: &Instrument, lookback_days: i64) -> Result<Vec<Bar>, ApiError> {
        let end = Utc::now();
        let start = lookback_start(end, lookback_days)?;
        let symbol = self.resolve_symbol(instrument).await?;

        info!(%instrument, %symbol, lookback_days, "fetching daily candles");

        let response: CandleResponse = self
            .get_json(
                instrument.candle_path(),
                &[
                    ("symbol", symbol.clone()),
                    ("resolution", "D".to_string()),
                    ("from", start.timestamp().to_string()),
                    ("to", end.timestamp().to_string()),
                ],
            )
            .await?;

        match response.into_bars(instrument.price_decimals()) {
            Ok(bars) => {
                debug!(%symbol, bars = bars.len(), "parsed candles");
                Ok(bars)
            }
            Err(e) => {
                warn!(%symbol, error = %e, "candle request returned no usable data");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_candles(json: &str, decimals: Option<i32>) -> Result<Vec<Bar>, ApiError> {
        serde_json::from_str::<CandleResponse>(json).unwrap().into_bars(decimals)
    }

    #[test]
    fn test_parse_crypto_pair() {
        assert_eq!(
            Instrument::parse("btc-usdt").unwrap(),
            Instrument::Crypto {
                base: "BTC".to_string(),
                quote: "USDT".to_string()
            }
        );
    }

    #[test]
    fn test_parse_forex_pair() {
        let instrument = Instrument::parse(" EUR/USD ").unwrap();
        assert_eq!(
            instrument,
            Instrument::Forex {
                base: "EUR".to_string(),
                quote: "USD".to_string()
            }
        );
        assert_eq!(instrument.to_string(), "EUR/USD");
        assert_eq!(instrument.price_decimals(), Some(5));
    }

    #[test]
    fn test_parse_equity() {
        assert_eq!(
            Instrument::parse("brk.b").unwrap(),
            Instrument::Equity {
                ticker: "BRK.B".to_string()
            }
        );
        assert_eq!(Instrument::parse("AAPL").unwrap().candle_path(), "stock/candle");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for symbol in ["", "   ", "BTC-", "/USD", "A-B-C", "EUR/USD/JPY", "...", "AA PL"] {
            assert!(
                matches!(Instrument::parse(symbol), Err(ApiError::UnsupportedSymbol(_))),
                "{:?} should be rejected",
                symbol
            );
        }
    }

    #[test]
    fn test_find_matching_symbol() {
        let symbols: Vec<CryptoSymbol> = serde_json::from_str(
            r#"[
                {"symbol": "BINANCE:ETHUSDT", "displaySymbol": "ETH/USDT", "description": "Binance ETHUSDT"},
                {"symbol": "BINANCE:BTCUSDT", "displaySymbol": "BTC/USDT", "description": "Binance BTCUSDT"}
            ]"#,
        )
        .unwrap();

        let matched = find_matching_symbol(&symbols, "BTC", "USDT").unwrap();
        assert_eq!(matched.symbol, "BINANCE:BTCUSDT");
        assert_eq!(matched.description, "Binance BTCUSDT");
        assert!(find_matching_symbol(&symbols, "DOGE", "USDT").is_none());
    }

    #[test]
    fn test_candles_into_bars() {
        let bars = parse_candles(
            r#"{"s": "ok",
                "t": [1700000000, 1700086400],
                "o": [1.0, 2.0], "h": [1.5, 2.5], "l": [0.5, 1.5],
                "c": [1.2, 2.2], "v": [100.0, 200.0]}"#,
            None,
        )
        .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp.timestamp(), 1700000000);
        assert_eq!(bars[1].close, Some(2.2));
        assert_eq!(bars[1].volume, Some(200.0));
    }

    #[test]
    fn test_candles_sorted_and_deduplicated() {
        let bars = parse_candles(
            r#"{"s": "ok",
                "t": [300, 100, 200, 300],
                "o": [3.0, 1.0, 2.0, 4.0], "h": [3.0, 1.0, 2.0, 4.0], "l": [3.0, 1.0, 2.0, 4.0],
                "c": [3.0, 1.0, 2.0, 4.0], "v": [1.0, 1.0, 1.0, 1.0]}"#,
            None,
        )
        .unwrap();

        let stamps: Vec<i64> = bars.iter().map(|b| b.timestamp.timestamp()).collect();
        assert_eq!(stamps, vec![100, 200, 300]);
        assert_eq!(bars[2].close, Some(4.0));
    }

    #[test]
    fn test_null_close_becomes_missing() {
        let bars = parse_candles(
            r#"{"s": "ok", "t": [1, 2],
                "o": [1.0, null], "h": [1.0, null], "l": [1.0, null],
                "c": [1.0, null], "v": [5.0, null]}"#,
            None,
        )
        .unwrap();

        assert_eq!(bars[1], Bar::missing(bars[1].timestamp));
    }

    #[test]
    fn test_forex_prices_rounded() {
        let bars = parse_candles(
            r#"{"s": "ok", "t": [1],
                "o": [1.0712345], "h": [1.0799999], "l": [1.0700001],
                "c": [1.0756789], "v": [10.123456]}"#,
            Some(FOREX_DECIMALS),
        )
        .unwrap();

        assert_eq!(bars[0].open, Some(1.07123));
        assert_eq!(bars[0].high, Some(1.08));
        assert_eq!(bars[0].close, Some(1.07568));
        // Volume is left alone
        assert_eq!(bars[0].volume, Some(10.123456));
    }

    #[test]
    fn test_no_data_status() {
        let err = parse_candles(r#"{"s": "no_data"}"#, None).unwrap_err();
        assert!(matches!(err, ApiError::NoData(_)));

        let err = parse_candles(r#"{"error": "You don't have access to this resource."}"#, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no data available: You don't have access to this resource."
        );
    }

    #[test]
    fn test_empty_ok_response_is_no_data() {
        let err = parse_candles(r#"{"s": "ok", "t": [], "o": [], "h": [], "l": [], "c": [], "v": []}"#, None)
            .unwrap_err();
        assert!(matches!(err, ApiError::NoData(_)));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = parse_candles(
            r#"{"s": "ok", "t": [1, 2], "o": [1.0, 2.0], "h": [1.0, 2.0], "l": [1.0, 2.0], "c": [1.0], "v": [1.0, 2.0]}"#,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = FinnhubClient::new(DEFAULT_BASE_URL, Some(String::new()));
        let instrument = Instrument::parse("AAPL").unwrap();

        let err = client.daily_bars(&instrument, 30).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_connection_error_hides_api_key() {
        // Nothing listens on port 1
        let client = FinnhubClient::new("http://127.0.0.1:1/api/v1", Some("SECRETKEY123".to_string()));
        let instrument = Instrument::parse("AAPL").unwrap();

        let err = client.daily_bars(&instrument, 30).await.unwrap_err();
        assert!(matches!(err, ApiError::RequestFailed(_)));
        assert!(!err.to_string().contains("SECRETKEY123"), "leaked key: {}", err);
    }

    #[test]
    fn test_lookback_start() {
        let end = Utc::now();
        assert_eq!(lookback_start(end, 30).unwrap(), end - Duration::days(30));
        for days in [0, -5, MAX_LOOKBACK_DAYS + 1, 200_000_000, i64::MAX] {
            assert!(
                matches!(lookback_start(end, days), Err(ApiError::InvalidLookback(d)) if d == days),
                "{} days should be rejected",
                days
            );
        }
    }

    #[tokio::test]
    async fn test_oversized_lookback_rejected_before_request() {
        let client = FinnhubClient::new("http://127.0.0.1:1/api/v1", Some("key".to_string()));
        let instrument = Instrument::parse("AAPL").unwrap();

        let err = client.daily_bars(&instrument, 200_000_000).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidLookback(200_000_000)));
    }

    #[tokio::test]
    async fn test_forex_symbol_resolution() {
        let client = FinnhubClient::new("http://localhost/", None);
        let instrument = Instrument::parse("GBP/JPY").unwrap();
        assert_eq!(client.resolve_symbol(&instrument).await.unwrap(), "OANDA:GBP_JPY");
        assert_eq!(client.base_url, "http://localhost");
    }
}
