use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::window::DEFAULT_WINDOW_MS;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_feed_url() -> String {
    "https://data-api.coindesk.com/spot/v1/latest/tick".into()
}

fn default_market() -> String {
    "coinbase".into()
}

fn default_instruments() -> Vec<String> {
    vec!["BTC-USD".into(), "ETH-USD".into(), "BNB-USD".into()]
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_requests_per_second() -> u32 {
    1
}

fn default_window_ms() -> i64 {
    DEFAULT_WINDOW_MS
}

fn default_execution_mode() -> String {
    "simulated".into()
}

fn default_execution_url() -> String {
    "https://api.coinbase.com/v2".into()
}

fn default_simulated_latency_ms() -> u64 {
    1000
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub signals: SignalConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub base_url: String,
    #[serde(default = "default_market")]
    pub market: String,
    #[serde(default = "default_instruments")]
    pub instruments: Vec<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_url(),
            market: default_market(),
            instruments: default_instruments(),
            api_key: None,
            poll_interval_secs: default_poll_interval_secs(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_ms")]
    pub duration_ms: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_window_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub ma_short: usize,
    pub ma_long: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            ma_short: 20,
            ma_long: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExecutionConfig {
    /// Accepted values: `"simulated"` | `"remote"`
    #[serde(default = "default_execution_mode")]
    pub mode: String,
    #[serde(default = "default_execution_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: default_execution_mode(),
            base_url: default_execution_url(),
            api_key: None,
            api_secret: None,
            simulated_latency_ms: default_simulated_latency_ms(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];
const VALID_EXECUTION_MODES: &[&str] = &["simulated", "remote"];

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_feed(config)?;
    validate_window(config)?;
    validate_indicators(config)?;
    validate_signals(config)?;
    validate_execution(config)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let format = config.general.log_format.as_str();
    if !VALID_LOG_FORMATS.contains(&format) {
        return Err(invalid(format!(
            "general.log_format \"{format}\" is not valid"
        )));
    }
    Ok(())
}

fn validate_feed(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let feed = &config.feed;
    if feed.instruments.is_empty() {
        return Err(invalid("feed.instruments must not be empty".into()));
    }
    if let Some(blank) = feed.instruments.iter().find(|i| i.trim().is_empty()) {
        return Err(invalid(format!("feed.instruments contains blank entry \"{blank}\"")));
    }
    if feed.poll_interval_secs == 0 {
        return Err(invalid("feed.poll_interval_secs must be > 0".into()));
    }
    if feed.timeout_secs == 0 {
        return Err(invalid("feed.timeout_secs must be > 0".into()));
    }
    if feed.requests_per_second == 0 {
        return Err(invalid("feed.requests_per_second must be > 0".into()));
    }
    Ok(())
}

fn validate_window(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.window.duration_ms <= 0 {
        return Err(invalid("window.duration_ms must be > 0".into()));
    }
    Ok(())
}

fn validate_indicators(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let ind = &config.indicators;
    let periods = [
        ("rsi_period", ind.rsi_period),
        ("macd_fast", ind.macd_fast),
        ("macd_slow", ind.macd_slow),
        ("macd_signal", ind.macd_signal),
        ("bollinger_period", ind.bollinger_period),
        ("ma_short", ind.ma_short),
        ("ma_long", ind.ma_long),
    ];
    for (name, value) in periods {
        if value == 0 {
            return Err(invalid(format!("indicators.{name} must be > 0")));
        }
    }
    if ind.macd_fast >= ind.macd_slow {
        return Err(invalid(
            "indicators.macd_fast must be < indicators.macd_slow".into(),
        ));
    }
    if ind.bollinger_multiplier.is_nan() || ind.bollinger_multiplier <= 0.0 {
        return Err(invalid("indicators.bollinger_multiplier must be > 0".into()));
    }
    Ok(())
}

fn validate_signals(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let s = &config.signals;
    if s.rsi_oversold >= s.rsi_overbought {
        return Err(invalid(
            "signals.rsi_oversold must be < signals.rsi_overbought".into(),
        ));
    }
    Ok(())
}

fn validate_execution(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let exec = &config.execution;
    if !VALID_EXECUTION_MODES.contains(&exec.mode.as_str()) {
        return Err(invalid(format!(
            "execution.mode \"{}\" is not valid",
            exec.mode
        )));
    }
    if exec.mode == "remote" {
        let missing = |v: &Option<String>| v.as_deref().is_none_or(|s| s.is_empty());
        if missing(&exec.api_key) || missing(&exec.api_secret) {
            return Err(invalid(
                "execution.api_key and execution.api_secret are required for remote mode".into(),
            ));
        }
    }
    Ok(())
}
