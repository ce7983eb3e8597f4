use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::*;
use postgres::NoTls;
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use serde::Deserialize;

const ENV_PREFIX: &str = "MENU_";

#[derive(Deserialize, Debug)]
pub struct Config {
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Deserialize, Debug)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct ApiConfig {
    /// Answer failures with error statuses rather than always 200.
    #[serde(default)]
    pub strict_errors: bool,
}

/// Settings taken from `MENU_*` environment variables, which win over the
/// file.
#[derive(Deserialize, Debug, Default)]
struct EnvOverrides {
    postgres_url: Option<String>,
    strict_errors: Option<bool>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Default)]
pub struct EnvLogger {
    #[serde(default)]
    level: Option<LogLevel>,
    #[serde(default)]
    modules: HashMap<String, LogLevel>,
    #[serde(default)]
    timestamp_nanos: bool,
}

fn default_pool_size() -> u32 {
    4
}

fn default_connection_timeout_secs() -> u64 {
    5
}

/// Reads a TOML file into `T`.
pub fn load<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let mut config_buf = String::new();
    File::open(path)
        .with_context(|| format!("open {:?}", path))?
        .read_to_string(&mut config_buf)
        .with_context(|| format!("read {:?}", path))?;
    let config = toml::from_str(&config_buf).with_context(|| format!("parse {:?}", path))?;
    Ok(config)
}

impl Config {
    pub fn apply_env(&mut self) -> Result<()> {
        let overrides = envy::prefixed(ENV_PREFIX)
            .from_env::<EnvOverrides>()
            .context("read environment overrides")?;
        self.apply(overrides);
        Ok(())
    }

    fn apply(&mut self, overrides: EnvOverrides) {
        if let Some(url) = overrides.postgres_url {
            debug!("Postgres url from ${}POSTGRES_URL", ENV_PREFIX);
            self.postgres.url = url;
        }
        if let Some(strict) = overrides.strict_errors {
            self.api.strict_errors = strict;
        }
    }
}

impl PostgresConfig {
    /// Builds the pool without waiting for a connection, so an unreachable
    /// database does not stop start-up.
    pub fn build(&self) -> Result<Pool<PostgresConnectionManager<NoTls>>> {
        debug!(
            "Build pool of {} connections, timeout {}s",
            self.pool_size, self.connection_timeout_secs
        );
        let pg = self
            .url
            .parse::<postgres::Config>()
            .context("parse postgres url")?;
        let manager = PostgresConnectionManager::new(pg, NoTls);

        let builder = r2d2::Pool::builder()
            .max_size(self.pool_size)
            .connection_timeout(Duration::from_secs(self.connection_timeout_secs));

        debug!("Pool builder: {:?}", builder);
        Ok(builder.build_unchecked(manager))
    }
}

impl LogLevel {
    fn to_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl EnvLogger {
    pub fn builder(&self) -> env_logger::Builder {
        let mut b = env_logger::Builder::from_default_env();
        if let Some(level) = self.level.as_ref() {
            b.filter_level(level.to_filter());
        }

        for (module, level) in self.modules.iter() {
            b.filter_module(module, level.to_filter());
        }

        if self.timestamp_nanos {
            b.format_timestamp_nanos();
        }

        b
    }
}
