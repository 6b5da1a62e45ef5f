//! Provider configuration with environment fallbacks

use serde_json::Value;

use crate::api::RetryConfig;
use crate::error::{FortiosError, Result};
use crate::support::{import_table_from_env, IMPORT_TABLE_ENV};

pub const HOSTNAME_ENV: &str = "FORTIOS_ACCESS_HOSTNAME";
pub const TOKEN_ENV: &str = "FORTIOS_ACCESS_TOKEN";
pub const INSECURE_ENV: &str = "FORTIOS_INSECURE";
pub const VDOM_ENV: &str = "FORTIOS_VDOM";
pub const HTTP_PROXY_ENV: &str = "FORTIOS_HTTP_PROXY";

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub hostname: String,
    pub token: String,
    pub insecure: bool,
    /// Default administrative domain, overridden per resource by `vdomparam`
    pub vdom: Option<String>,
    /// Default for `get_all_tables`, read once from `FORTIOS_IMPORT_TABLE`
    pub import_table: bool,
    pub http_proxy: Option<String>,
    pub retry: RetryConfig,
}

impl ProviderConfig {
    /// Build the configuration from the provider block, falling back to
    /// `FORTIOS_*` environment variables for anything left unset
    pub fn resolve(config: &Value) -> Result<Self> {
        let hostname = config_string(config, "hostname", HOSTNAME_ENV).ok_or_else(|| {
            FortiosError::Config(format!(
                "hostname is required (set in provider config or {} env var)",
                HOSTNAME_ENV
            ))
        })?;

        let token = config_string(config, "token", TOKEN_ENV).ok_or_else(|| {
            FortiosError::Config(format!(
                "token is required (set in provider config or {} env var)",
                TOKEN_ENV
            ))
        })?;

        let insecure = config
            .get("insecure")
            .and_then(Value::as_bool)
            .or_else(|| {
                std::env::var(INSECURE_ENV)
                    .ok()
                    .and_then(|v| v.trim().parse::<bool>().ok())
            })
            .unwrap_or(false);

        let import_table = config
            .get("import_table")
            .and_then(Value::as_bool)
            .unwrap_or_else(import_table_from_env);

        let mut retry = RetryConfig::default();
        if let Some(max_retries) = config.get("max_retries").and_then(Value::as_u64) {
            retry.max_retries = u32::try_from(max_retries).map_err(|_| {
                FortiosError::Config(format!("max_retries out of range: {}", max_retries))
            })?;
        }

        tracing::debug!(
            "Resolved provider configuration for {} (insecure={}, {}={})",
            hostname,
            insecure,
            IMPORT_TABLE_ENV,
            import_table
        );

        Ok(Self {
            hostname,
            token,
            insecure,
            vdom: config_string(config, "vdom", VDOM_ENV),
            import_table,
            http_proxy: config_string(config, "http_proxy", HTTP_PROXY_ENV),
            retry,
        })
    }
}

fn config_string(config: &Value, key: &str, env: &str) -> Option<String> {
    config
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| std::env::var(env).ok())
        .filter(|s| !s.trim().is_empty())
}
