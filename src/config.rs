use std::env;

use anyhow::Context;
use chrono_tz::Tz;

const DEFAULT_DATABASE_URL: &str = "sqlite://studio.db";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub default_tz: Tz,
}

impl Config {
    /// Read configuration from the environment, falling back to
    /// development defaults. A present-but-invalid value is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        let default_tz = match env::var("DEFAULT_TZ") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("DEFAULT_TZ is not a known IANA timezone: {raw}"))?,
            Err(_) => chrono_tz::UTC,
        };

        Ok(Self {
            database_url,
            port,
            default_tz,
        })
    }
}
