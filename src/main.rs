use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use market_signals::analysis::{tail, AnalysisParams, AnalysisRow, DEFAULT_TAIL_ROWS};
use market_signals::api_client::FinnhubClient;
use market_signals::config::Settings;
use market_signals::routes;
use market_signals::services::analysis_service::analyze_symbol;
use market_signals::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "market-signals", version, about = "SMA/RSI trading signals over daily candles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a symbol (BTC-USDT, EUR/USD, AAPL) and print its latest rows
    Analyze {
        symbol: String,
        /// Number of most recent rows to print
        #[arg(long, default_value_t = DEFAULT_TAIL_ROWS)]
        rows: usize,
        /// Print rows as JSON instead of a table
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Serve analyses over HTTP
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: SocketAddr,
        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(Args)]
struct ParamArgs {
    #[arg(long)]
    short_window: Option<usize>,
    #[arg(long)]
    long_window: Option<usize>,
    #[arg(long)]
    ema_span: Option<usize>,
    #[arg(long)]
    rsi_window: Option<usize>,
    #[arg(long)]
    overbought: Option<f64>,
    #[arg(long)]
    oversold: Option<f64>,
}

impl From<ParamArgs> for AnalysisParams {
    fn from(args: ParamArgs) -> Self {
        let defaults = AnalysisParams::default();
        AnalysisParams {
            short_window: args.short_window.unwrap_or(defaults.short_window),
            long_window: args.long_window.unwrap_or(defaults.long_window),
            ema_span: args.ema_span.unwrap_or(defaults.ema_span),
            rsi_window: args.rsi_window.unwrap_or(defaults.rsi_window),
            overbought: args.overbought.unwrap_or(defaults.overbought),
            oversold: args.oversold.unwrap_or(defaults.oversold),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    // Logs go to stderr so printed rows stay clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("invalid configuration")?;
    let client = FinnhubClient::new(settings.finnhub_base_url.clone(), settings.finnhub_api_key.clone());

    match cli.command {
        Command::Analyze { symbol, rows, json, params } => {
            let params = AnalysisParams::from(params);
            let analysis = analyze_symbol(&client, &symbol, settings.lookback_days, &params)
                .await
                .with_context(|| format!("failed to analyze {}", symbol))?;

            let latest = tail(&analysis, rows);
            if json {
                println!("{}", serde_json::to_string_pretty(latest)?);
            } else {
                print_table(&symbol, latest);
            }
        }
        Command::Serve { addr, params } => {
            let state = AppState::new(Arc::new(client), settings.lookback_days, params.into());
            let app = routes::router(state);

            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;
            info!("Server listening on {}", addr);
            axum::serve(listener, app).await.context("server error")?;
        }
    }

    Ok(())
}

fn print_table(symbol: &str, rows: &[AnalysisRow]) {
    fn cell(value: Option<f64>) -> String {
        value.map(|v| format!("{:.5}", v)).unwrap_or_else(|| "-".to_string())
    }

    println!("{}", symbol.trim().to_uppercase());
    println!(
        "{:<10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>9} {:>6} {:>6}",
        "date", "close", "sma_short", "sma_long", "ema", "rsi", "volume", "sma", "rsi"
    );
    for row in rows {
        println!(
            "{:<10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>9} {:>6} {:>6}",
            row.bar.timestamp.format("%Y-%m-%d").to_string(),
            cell(row.bar.close),
            cell(row.sma_short),
            cell(row.sma_long),
            cell(row.ema),
            cell(row.rsi),
            row.bar.volume.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "-".to_string()),
            row.sma_signal,
            row.rsi_signal,
        );
    }
}
