//! Process configuration read from the environment.

use std::env;

use thiserror::Error;

use crate::domain::order::BankAccount;

const DEFAULT_STORE_URL: &str = "https://www.hdmobil.sk";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub admin_token: String,
    pub store_url: String,
    pub bank: BankAccount,
    pub stripe_webhook_secret: Option<String>,
    pub db_pool_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source; blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));
        let or = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value: raw,
            })?,
            None => 8080,
        };
        let db_pool_size = match var("DB_POOL_SIZE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DB_POOL_SIZE",
                        expected: "positive integer",
                        value: raw,
                    })
                }
            },
            None => 10,
        };

        Ok(AppConfig {
            database_url: required("DATABASE_URL")?,
            host: or("HOST", "0.0.0.0"),
            port,
            admin_token: required("ADMIN_TOKEN")?,
            store_url: or("STORE_URL", DEFAULT_STORE_URL).trim_end_matches('/').to_string(),
            bank: BankAccount {
                iban: or("BANK_IBAN", "SK12 1234 5678 9012 3456 7890"),
                bic: or("BANK_BIC", "GIBASKBX"),
                account_holder: or("BANK_ACCOUNT_HOLDER", "HDmobil s.r.o."),
            },
            stripe_webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
            db_pool_size,
        })
    }
}
