use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_SUPPLIERS_BASE_URL: &str = "https://suppliers-api.wildberries.ru";
pub const DEFAULT_STATISTICS_BASE_URL: &str = "https://statistics-api.wildberries.ru";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Pure over `lookup`; tests pass a `HashMap` instead of touching the process env.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let wb_token = require("WB_TOKEN")?;

    let env = parse_environment(&or_default("WBDASH_ENV", "development"))?;

    let bind_addr = parse_addr("WBDASH_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("WBDASH_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("WBDASH_CATALOG_PATH", "./config/catalog.yaml"));
    let static_dir = PathBuf::from(or_default("WBDASH_STATIC_DIR", "./static"));

    let (auth_password, session_secret) = if env == Environment::Development {
        (
            optional("WBDASH_AUTH_PASSWORD"),
            optional("WBDASH_SESSION_SECRET"),
        )
    } else {
        (
            Some(require("WBDASH_AUTH_PASSWORD")?),
            Some(require("WBDASH_SESSION_SECRET")?),
        )
    };

    let refresh_minutes = parse_u64("WBDASH_REFRESH_MINUTES", "10")?;
    if refresh_minutes == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WBDASH_REFRESH_MINUTES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let suppliers_base_url = or_default("WBDASH_SUPPLIERS_BASE_URL", DEFAULT_SUPPLIERS_BASE_URL);
    let statistics_base_url =
        or_default("WBDASH_STATISTICS_BASE_URL", DEFAULT_STATISTICS_BASE_URL);
    let request_timeout_secs = parse_u64("WBDASH_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WBDASH_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        static_dir,
        wb_token,
        auth_password,
        session_secret,
        refresh_minutes,
        suppliers_base_url,
        statistics_base_url,
        request_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WBDASH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
