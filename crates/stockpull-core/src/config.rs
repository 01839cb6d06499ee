use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::AppConfig;
use crate::category::CategoryRoots;
use crate::ConfigError;

const DEFAULT_ALLOWED_ORIGINS: &str =
    "https://salpasistemas.github.io,http://localhost:3000,http://127.0.0.1:5500";

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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let odoo_url = require("ODOO_URL")?.trim_end_matches('/').to_string();
    let odoo_db = require("ODOO_DB")?;
    let odoo_username = require("ODOO_USERNAME")?;
    let odoo_password = require("ODOO_PASSWORD")?;

    let bind_addr: SocketAddr = parse_var(
        "STOCKPULL_BIND_ADDR",
        &or_default("STOCKPULL_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("STOCKPULL_LOG_LEVEL", "info");
    let request_timeout_secs: u64 = parse_var(
        "STOCKPULL_REQUEST_TIMEOUT_SECS",
        &or_default("STOCKPULL_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    let price_concurrency: usize = parse_var(
        "STOCKPULL_PRICE_CONCURRENCY",
        &or_default("STOCKPULL_PRICE_CONCURRENCY", "8"),
    )?;

    let category_roots = CategoryRoots {
        a: optional("STOCKPULL_CATEGORY_A_ID")
            .map(|raw| parse_var("STOCKPULL_CATEGORY_A_ID", &raw))
            .transpose()?,
        b: optional("STOCKPULL_CATEGORY_B_ID")
            .map(|raw| parse_var("STOCKPULL_CATEGORY_B_ID", &raw))
            .transpose()?,
    };

    let export_price_factor: Decimal = parse_var(
        "STOCKPULL_EXPORT_PRICE_FACTOR",
        &or_default("STOCKPULL_EXPORT_PRICE_FACTOR", "1"),
    )?;
    if export_price_factor.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOCKPULL_EXPORT_PRICE_FACTOR".to_string(),
            reason: "factor must not be negative".to_string(),
        });
    }

    let allowed_origins = parse_origins(&or_default(
        "STOCKPULL_ALLOWED_ORIGINS",
        DEFAULT_ALLOWED_ORIGINS,
    ));

    Ok(AppConfig {
        odoo_url,
        odoo_db,
        odoo_username,
        odoo_password,
        bind_addr,
        log_level,
        request_timeout_secs,
        price_concurrency,
        category_roots,
        export_price_factor,
        allowed_origins,
        sheet_template_id: optional("GOOGLE_SHEET_TEMPLATE_ID"),
        google_access_token: optional("GOOGLE_ACCESS_TOKEN"),
        sheet_name: or_default("STOCKPULL_SHEET_NAME", "PEDIDO"),
        sheet_anchor: or_default("STOCKPULL_SHEET_ANCHOR", "A2"),
        xlsx_template_path: optional("STOCKPULL_XLSX_TEMPLATE").map(PathBuf::from),
    })
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Splits a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
