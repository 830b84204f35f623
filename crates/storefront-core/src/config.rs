use crate::app_config::{AppConfig, DatastoreKind, Environment};
use crate::ConfigError;

const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_PRODUCT_API_URL: &str = "https://fakestoreapi.com";
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_SHIPPING_COUNTRIES: &str = "IN,US,OM,CA,GB";

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
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
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

    let env = parse_environment(&or_default("STOREFRONT_ENV", "development"))?;
    let api_key_hash_salt = require("STOREFRONT_API_KEY_HASH_SALT")?;
    let admin_api_keys = split_list(&or_default("STOREFRONT_ADMIN_API_KEYS", ""));

    let datastore = match or_default("STOREFRONT_DATASTORE", "firestore").as_str() {
        "firestore" => DatastoreKind::Firestore {
            project_id: require("FIRESTORE_PROJECT_ID")?,
            base_url: or_default("FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_BASE_URL),
            access_token: lookup("FIRESTORE_ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
        },
        "postgres" => DatastoreKind::Postgres {
            database_url: require("DATABASE_URL")?,
        },
        "memory" => DatastoreKind::Memory,
        other => {
            return Err(ConfigError::InvalidEnvVar {
                var: "STOREFRONT_DATASTORE".to_string(),
                reason: format!("expected firestore, postgres, or memory; got '{other}'"),
            })
        }
    };

    let bind_addr = parse_addr("STOREFRONT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STOREFRONT_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("STOREFRONT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("STOREFRONT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("STOREFRONT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let product_api_url = or_default("STOREFRONT_PRODUCT_API_URL", DEFAULT_PRODUCT_API_URL);
    let http_timeout_secs = parse_u64("STOREFRONT_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("STOREFRONT_USER_AGENT", "storefront/0.1");
    let supplemental_products_path = lookup("STOREFRONT_SUPPLEMENTAL_PRODUCTS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let new_releases_count = parse_usize("STOREFRONT_NEW_RELEASES_COUNT", "10")?;
    let deals_count = parse_usize("STOREFRONT_DEALS_COUNT", "8")?;

    let stripe_secret_key = lookup("STRIPE_SECRET_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let stripe_api_base = or_default("STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE);
    let public_url = or_default("STOREFRONT_PUBLIC_URL", "http://localhost:3000")
        .trim_end_matches('/')
        .to_string();
    let currency = or_default("STOREFRONT_CURRENCY", "usd").to_lowercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_CURRENCY".to_string(),
            reason: format!("expected a three-letter ISO currency code, got '{currency}'"),
        });
    }
    let shipping_countries: Vec<String> = split_list(&or_default(
        "STOREFRONT_SHIPPING_COUNTRIES",
        DEFAULT_SHIPPING_COUNTRIES,
    ))
    .into_iter()
    .map(|c| c.to_uppercase())
    .collect();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_key_hash_salt,
        admin_api_keys,
        datastore,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        product_api_url,
        http_timeout_secs,
        user_agent,
        supplemental_products_path,
        new_releases_count,
        deals_count,
        stripe_secret_key,
        stripe_api_base,
        public_url,
        currency,
        shipping_countries,
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
