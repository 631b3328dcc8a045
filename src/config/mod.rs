//! Configuration for the agent service
//!
//! Settings are loaded once at startup and handed to every component by
//! reference. There is no global instance.

pub mod env;

use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

pub use env::NESTED_DELIMITER;

/// Default LLM endpoint (OpenAI Responses API lives under it)
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Trading-specific controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Venue name reported in paper order acceptances
    pub exchange: String,
    /// Traded pair
    pub symbol: String,
    /// Largest risk a single intent may carry (USD)
    pub max_daily_loss_usd: f64,
    /// Carried for reporting only; every accepted intent is a paper order
    pub paper_trading: bool,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            exchange: "Binance AUS".to_string(),
            symbol: "BTCUSDT".to_string(),
            max_daily_loss_usd: 20.0,
            paper_trading: true,
        }
    }
}

/// Top-level settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_name: String,
    /// Deployment tag (dev, staging, prod)
    pub environment: String,
    pub runtime_language: String,
    /// LLM provider name reported by /health
    pub cloud_llm_provider: String,
    /// Missing when unset or blank
    #[serde(deserialize_with = "deserialize_api_key")]
    pub openai_api_key: Option<SecretString>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub openai_timeout_secs: u64,
    pub dashboard_enabled: bool,
    /// Directory all path-based tool actions are confined to
    pub workspace_root: PathBuf,
    pub trading: TradingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "bitcoin-test-agent".to_string(),
            environment: "dev".to_string(),
            runtime_language: "rust".to_string(),
            cloud_llm_provider: "openai".to_string(),
            openai_api_key: None,
            openai_model: "gpt-4.1-mini".to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_timeout_secs: 120,
            dashboard_enabled: true,
            workspace_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            trading: TradingConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::process_vars())
    }

    /// Load settings from an explicit set of variables
    ///
    /// Unknown variables are ignored; known ones override the defaults.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let source = env::setting_vars(vars);
        tracing::debug!(count = source.len(), "Binding settings from environment");

        let settings: Settings = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator(NESTED_DELIMITER)
                    .source(Some(source)),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.openai_base_url).map_err(|e| {
            Error::Config(format!(
                "invalid OPENAI_BASE_URL '{}': {}",
                self.openai_base_url, e
            ))
        })?;
        if self.openai_timeout_secs == 0 {
            return Err(Error::Config(
                "OPENAI_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.trading.max_daily_loss_usd.is_nan() {
            return Err(Error::Config(
                "TRADING__MAX_DAILY_LOSS_USD must be a number".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether an LLM credential is configured
    pub fn has_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Settings as JSON with the credential masked
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::json!({
            "app_name": self.app_name,
            "environment": self.environment,
            "runtime_language": self.runtime_language,
            "cloud_llm_provider": self.cloud_llm_provider,
            "openai_api_key": self.openai_api_key.as_ref().map(|key| mask(key.expose_secret())),
            "openai_model": self.openai_model,
            "openai_base_url": self.openai_base_url,
            "openai_timeout_secs": self.openai_timeout_secs,
            "dashboard_enabled": self.dashboard_enabled,
            "workspace_root": self.workspace_root.display().to_string(),
            "trading": self.trading,
        })
    }
}

fn deserialize_api_key<'de, D>(deserializer: D) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from))
}

/// Keep the last four characters of long keys, nothing of short ones
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
