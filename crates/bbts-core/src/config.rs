use crate::app_config::{AppConfig, Backend, PaginationStyle};
use crate::ConfigError;

/// Desktop Chrome UA sent by both backends; the storefront serves a stripped
/// page to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
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
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// `PAGE_SIZE`, `PAGE_LIMIT` and `DEBUG` keep their unprefixed names so
/// existing scheduler jobs that export them keep working.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let page_size = parse_u32("PAGE_SIZE", "100")?;
    if page_size == 0 {
        return Err(invalid("PAGE_SIZE", "must be at least 1".to_string()));
    }
    let page_limit = parse_u32("PAGE_LIMIT", "5")?;
    let debug = parse_flag("DEBUG", &or_default("DEBUG", "0"))?;

    let backend = or_default("BBTS_BACKEND", "http")
        .parse::<Backend>()
        .map_err(|reason| invalid("BBTS_BACKEND", reason))?;
    let pagination = or_default("BBTS_PAGINATION", "page-index")
        .parse::<PaginationStyle>()
        .map_err(|reason| invalid("BBTS_PAGINATION", reason))?;

    let base_url = or_default("BBTS_BASE_URL", "https://www.bigbadtoystore.com");
    let output_path = PathBuf::from(or_default("BBTS_OUTPUT_PATH", "outputs.csv"));
    let log_level = or_default("BBTS_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("BBTS_REQUEST_TIMEOUT_SECS", "30")?;
    let ready_timeout_secs = parse_u64("BBTS_READY_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("BBTS_USER_AGENT", DEFAULT_USER_AGENT);
    let webdriver_url = or_default("BBTS_WEBDRIVER_URL", "http://localhost:4444");
    let headless = parse_flag("BBTS_HEADLESS", &or_default("BBTS_HEADLESS", "true"))?;
    let inter_request_delay_ms = parse_u64("BBTS_INTER_REQUEST_DELAY_MS", "250")?;

    Ok(AppConfig {
        base_url,
        page_size,
        page_limit,
        debug,
        backend,
        pagination,
        output_path,
        log_level,
        request_timeout_secs,
        ready_timeout_secs,
        user_agent,
        webdriver_url,
        headless,
        inter_request_delay_ms,
    })
}

/// Parse a boolean-ish flag. Accepts `1`/`0`, `true`/`false`, `yes`/`no`.
fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean flag, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
