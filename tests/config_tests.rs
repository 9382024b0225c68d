//! Tests for aggregation configuration.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Mutex, OnceLock};

use rill::aggregation::{AggregationOptions, RateLimitPolicy};
use rill::config::{AggregatorConfig, MERGE_TOOL_CALLS_ENV, RATE_LIMIT_POLICY_ENV};
use rill::error::{ErrorCategory, RillError};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 2] = [RATE_LIMIT_POLICY_ENV, MERGE_TOOL_CALLS_ENV];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_use_latest_rate_limit_and_merge_tool_calls() {
    let config = AggregatorConfig::new();
    let options = config.options_for("openai");
    assert_eq!(options.rate_limit_policy, RateLimitPolicy::Latest);
    assert!(options.merge_tool_calls);
}

#[test]
fn toml_provider_override_applies_only_to_that_provider() {
    let config = AggregatorConfig::from_toml_str(
        r#"
        [defaults]
        merge_tool_calls = false

        [providers.openai]
        rate_limit_policy = "first_wins"
        "#,
    )
    .unwrap();

    assert_eq!(
        config.options_for("openai"),
        AggregationOptions {
            rate_limit_policy: RateLimitPolicy::FirstWins,
            merge_tool_calls: false,
        }
    );
    assert_eq!(
        config.options_for("anthropic"),
        AggregationOptions {
            rate_limit_policy: RateLimitPolicy::Latest,
            merge_tool_calls: false,
        }
    );
    assert_eq!(
        config.aggregator_for("openai").options().rate_limit_policy,
        RateLimitPolicy::FirstWins
    );
}

#[test]
fn invalid_toml_is_a_configuration_error() {
    let err = AggregatorConfig::from_toml_str("[defaults]\nrate_limit_policy = \"sometimes\"")
        .unwrap_err();
    assert!(matches!(err, RillError::ConfigParse(_)));
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn from_file_reads_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[providers.qianfan]\nmerge_tool_calls = false").unwrap();

    let config = AggregatorConfig::from_file(file.path()).unwrap();
    assert!(!config.options_for("qianfan").merge_tool_calls);
    assert!(config.options_for("openai").merge_tool_calls);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AggregatorConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, RillError::Io(_)));
}

#[test]
fn env_overlay_sets_defaults() {
    let mut config = AggregatorConfig::new();
    config
        .apply_env_from(lookup(&[
            (RATE_LIMIT_POLICY_ENV, "first_wins"),
            (MERGE_TOOL_CALLS_ENV, "off"),
        ]))
        .unwrap();

    assert_eq!(config.defaults.rate_limit_policy, RateLimitPolicy::FirstWins);
    assert!(!config.defaults.merge_tool_calls);
}

#[test]
fn env_overlay_rejects_unknown_values() {
    let mut config = AggregatorConfig::new();
    let err = config
        .apply_env_from(lookup(&[(RATE_LIMIT_POLICY_ENV, "newest")]))
        .unwrap_err();
    assert!(matches!(err, RillError::Configuration(_)));

    let err = config
        .apply_env_from(lookup(&[(MERGE_TOOL_CALLS_ENV, "maybe")]))
        .unwrap_err();
    assert!(err.to_string().contains(MERGE_TOOL_CALLS_ENV));
}

#[test]
fn explicit_provider_policy_beats_env_defaults() {
    let mut config = AggregatorConfig::new();
    config
        .apply_env_from(lookup(&[(RATE_LIMIT_POLICY_ENV, "first_wins")]))
        .unwrap();
    config.set_provider_policy("anthropic", RateLimitPolicy::Latest);

    assert_eq!(
        config.options_for("anthropic").rate_limit_policy,
        RateLimitPolicy::Latest
    );
    assert_eq!(
        config.options_for("openai").rate_limit_policy,
        RateLimitPolicy::FirstWins
    );
}

#[test]
fn from_env_reads_process_environment() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }

    std::env::set_var(RATE_LIMIT_POLICY_ENV, "first_wins");
    let config = AggregatorConfig::from_env().unwrap();

    assert_eq!(config.defaults.rate_limit_policy, RateLimitPolicy::FirstWins);
    assert!(config.defaults.merge_tool_calls);
}

#[test]
fn load_layers_env_over_file() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[defaults]\nrate_limit_policy = \"first_wins\"\nmerge_tool_calls = false").unwrap();
    std::env::set_var(MERGE_TOOL_CALLS_ENV, "true");

    let config = AggregatorConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.defaults.rate_limit_policy, RateLimitPolicy::FirstWins);
    assert!(config.defaults.merge_tool_calls);
}
