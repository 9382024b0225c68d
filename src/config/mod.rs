//! Aggregation configuration (layered: code > env > file > defaults).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregation::{AggregationOptions, MessageAggregator, RateLimitPolicy};
use crate::error::{Result, RillError};

/// Environment variable overriding the default rate-limit policy.
pub const RATE_LIMIT_POLICY_ENV: &str = "RILL_RATE_LIMIT_POLICY";
/// Environment variable overriding default tool-call merging.
pub const MERGE_TOOL_CALLS_ENV: &str = "RILL_MERGE_TOOL_CALLS";

/// Aggregation settings, with optional overrides per provider adapter.
///
/// ```toml
/// [defaults]
/// rate_limit_policy = "latest"
///
/// [providers.openai]
/// rate_limit_policy = "first_wins"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub defaults: AggregationOptions,
    pub providers: HashMap<String, ProviderOverride>,
}

/// Settings for one provider; unset fields fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOverride {
    pub rate_limit_policy: Option<RateLimitPolicy>,
    pub merge_tool_calls: Option<bool>,
}

impl AggregatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Defaults overlaid with the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();
        config.apply_env()?;
        Ok(config)
    }

    /// Read `path` if given, then overlay the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, which maps variable names to values.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(RATE_LIMIT_POLICY_ENV) {
            self.defaults.rate_limit_policy = raw.trim().parse().map_err(|_| {
                RillError::Configuration(format!(
                    "{RATE_LIMIT_POLICY_ENV}: unknown rate limit policy '{raw}'"
                ))
            })?;
        }

        if let Some(raw) = lookup(MERGE_TOOL_CALLS_ENV) {
            self.defaults.merge_tool_calls = parse_bool(&raw).ok_or_else(|| {
                RillError::Configuration(format!("{MERGE_TOOL_CALLS_ENV}: expected a boolean, got '{raw}'"))
            })?;
        }

        Ok(())
    }

    pub fn set_provider_policy(&mut self, provider: impl Into<String>, policy: RateLimitPolicy) {
        self.providers
            .entry(provider.into())
            .or_default()
            .rate_limit_policy = Some(policy);
    }

    /// Effective options for `provider`.
    pub fn options_for(&self, provider: &str) -> AggregationOptions {
        let mut options = self.defaults;
        if let Some(overrides) = self.providers.get(provider) {
            if let Some(policy) = overrides.rate_limit_policy {
                options.rate_limit_policy = policy;
            }
            if let Some(merge) = overrides.merge_tool_calls {
                options.merge_tool_calls = merge;
            }
        }
        options
    }

    pub fn aggregator_for(&self, provider: &str) -> MessageAggregator {
        MessageAggregator::with_options(self.options_for(provider))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
