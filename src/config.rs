use anyhow::{bail, Context, Result};

use crate::api_client::{DEFAULT_BASE_URL, MAX_LOOKBACK_DAYS};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Process settings sourced from the environment (and `.env`, when present)
#[derive(Debug, Clone)]
pub struct Settings {
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: String,
    pub lookback_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            finnhub_api_key: None,
            finnhub_base_url: DEFAULT_BASE_URL.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        settings.finnhub_api_key = lookup("FINNHUB_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        if let Some(url) = lookup("FINNHUB_BASE_URL").filter(|u| !u.trim().is_empty()) {
            settings.finnhub_base_url = url.trim().to_string();
        }

        if let Some(days) = lookup("MARKET_SIGNALS_LOOKBACK_DAYS") {
            let days: i64 = days
                .trim()
                .parse()
                .with_context(|| format!("MARKET_SIGNALS_LOOKBACK_DAYS is not an integer: {:?}", days))?;
            if days <= 0 || days > MAX_LOOKBACK_DAYS {
                bail!(
                    "MARKET_SIGNALS_LOOKBACK_DAYS must be between 1 and {}, got {}",
                    MAX_LOOKBACK_DAYS,
                    days
                );
            }
            settings.lookback_days = days;
        }

        Ok(settings)
    }
}
