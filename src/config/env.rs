//! Environment variable binding
//!
//! Settings are read from the process environment (after `.env` has been
//! loaded by the binary). Nested trading options use a double-underscore
//! delimiter, following the usual twelve-factor convention:
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//! export TRADING__MAX_DAILY_LOSS_USD=50
//! export TRADING__SYMBOL=BTCUSDT
//! ```
//!
//! Variable names are case-insensitive. Anything that is not a known setting
//! is ignored, so unrelated variables (`PATH`, `__CF_USER_TEXT_ENCODING`, ...)
//! can never break loading.

/// Separator between a nested block and its field
pub const NESTED_DELIMITER: &str = "__";

/// Environment variable names
pub mod vars {
    pub const APP_NAME: &str = "APP_NAME";
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    pub const RUNTIME_LANGUAGE: &str = "RUNTIME_LANGUAGE";
    pub const CLOUD_LLM_PROVIDER: &str = "CLOUD_LLM_PROVIDER";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    pub const OPENAI_TIMEOUT_SECS: &str = "OPENAI_TIMEOUT_SECS";
    pub const DASHBOARD_ENABLED: &str = "DASHBOARD_ENABLED";
    pub const WORKSPACE_ROOT: &str = "WORKSPACE_ROOT";

    /// Prefix of the nested trading block (`TRADING__EXCHANGE`, ...)
    pub const TRADING_PREFIX: &str = "TRADING__";
}

const TOP_LEVEL: &[&str] = &[
    vars::APP_NAME,
    vars::ENVIRONMENT,
    vars::RUNTIME_LANGUAGE,
    vars::CLOUD_LLM_PROVIDER,
    vars::OPENAI_API_KEY,
    vars::OPENAI_MODEL,
    vars::OPENAI_BASE_URL,
    vars::OPENAI_TIMEOUT_SECS,
    vars::DASHBOARD_ENABLED,
    vars::WORKSPACE_ROOT,
];

/// Whether an environment variable name binds a setting
pub fn is_setting_var(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    if TOP_LEVEL.contains(&upper.as_str()) {
        return true;
    }
    upper
        .strip_prefix(vars::TRADING_PREFIX)
        .is_some_and(|field| !field.is_empty() && !field.contains(NESTED_DELIMITER))
}

/// Keep only the variables that bind a setting
pub fn setting_vars<I>(vars: I) -> config::Map<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter(|(name, _)| is_setting_var(name))
        .collect()
}

/// Snapshot of the process environment, skipping non-UTF-8 entries
pub fn process_vars() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(name, value)| {
        let name = name.into_string().ok()?;
        let value = value.into_string().ok()?;
        Some((name, value))
    })
}
