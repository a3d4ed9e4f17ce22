use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; brandscan/",
    env!("CARGO_PKG_VERSION"),
    "; +page-finder)"
);

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let log_level = or_default("BRANDSCAN_LOG_LEVEL", "info");
    let catalog_path = lookup("BRANDSCAN_CATALOG_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let request_timeout_secs = parse_u64("BRANDSCAN_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("BRANDSCAN_USER_AGENT", DEFAULT_USER_AGENT);
    let workers = parse_usize("BRANDSCAN_WORKERS", "8")?;
    if workers == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BRANDSCAN_WORKERS".to_string(),
            reason: "worker count must be at least 1".to_string(),
        });
    }
    let request_delay_ms = parse_u64("BRANDSCAN_REQUEST_DELAY_MS", "100")?;
    let page_budget = parse_usize("BRANDSCAN_PAGE_BUDGET", "800")?;
    let max_retries = parse_u32("BRANDSCAN_MAX_RETRIES", "0")?;
    let retry_backoff_base_secs = parse_u64("BRANDSCAN_RETRY_BACKOFF_BASE_SECS", "1")?;
    let result_ttl_secs = parse_u64("BRANDSCAN_RESULT_TTL_SECS", "600")?;

    Ok(AppConfig {
        log_level,
        catalog_path,
        request_timeout_secs,
        user_agent,
        workers,
        request_delay_ms,
        page_budget,
        max_retries,
        retry_backoff_base_secs,
        result_ttl_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
