//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variables are missing, falls back to a config file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `WREN_CONSUMER_KEY`: OAuth consumer key (required)
//! - `WREN_CONSUMER_SECRET`: OAuth consumer secret (required)
//! - `WREN_ACCESS_TOKEN`: Pre-obtained access token (optional)
//! - `WREN_ACCESS_TOKEN_SECRET`: Access token secret (optional)
//! - `WREN_RETRY_MAX_ATTEMPTS`: Total attempts per request (optional)
//! - `WREN_RETRY_INTERVAL_SECS`: Sleep between attempts (optional)
//! - `WREN_DISPATCHER_POOL_SIZE`: Dispatcher worker count (optional)
//!
//! ## File Locations
//! The loader probes `config.{toml,json}` and `wren.{toml,json}` in the
//! working directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use wren_common::error::{ClientError, ClientResult};
use wren_common::{ClientConfig, DispatcherConfig, RetryConfig};

use wren_common::config::CredentialsConfig;

/// Load configuration with automatic fallback strategy.
///
/// Environment variables are tried first; if the required ones are
/// missing, the standard file locations are probed. The result is
/// validated before it is returned.
pub fn load() -> ClientResult<ClientConfig> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "environment incomplete, probing config files");
            load_from_file(None)?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from `WREN_*` environment variables.
///
/// The consumer key and secret are required; everything else falls back
/// to defaults.
pub fn load_from_env() -> ClientResult<ClientConfig> {
    let consumer_key = env_var("WREN_CONSUMER_KEY")?;
    let consumer_secret = env_var("WREN_CONSUMER_SECRET")?;
    let access_token = std::env::var("WREN_ACCESS_TOKEN").ok();
    let access_token_secret = std::env::var("WREN_ACCESS_TOKEN_SECRET").ok();

    let mut retry = RetryConfig::default();
    if let Some(attempts) = env_parse::<u32>("WREN_RETRY_MAX_ATTEMPTS")? {
        retry.max_attempts = attempts;
    }
    if let Some(secs) = env_parse::<u64>("WREN_RETRY_INTERVAL_SECS")? {
        retry.interval = Duration::from_secs(secs);
    }

    let mut dispatcher = DispatcherConfig::default();
    if let Some(pool_size) = env_parse::<usize>("WREN_DISPATCHER_POOL_SIZE")? {
        dispatcher.pool_size = pool_size;
    }

    Ok(ClientConfig {
        credentials: CredentialsConfig {
            consumer_key,
            consumer_secret,
            access_token,
            access_token_secret,
        },
        endpoints: Default::default(),
        http: Default::default(),
        retry,
        dispatcher,
    })
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations. Format is chosen
/// by file extension.
pub fn load_from_file(path: Option<PathBuf>) -> ClientResult<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ClientError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ClientError::Config("no config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ClientError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format by extension.
fn parse_config(contents: &str, path: &Path) -> ClientResult<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClientError::Config(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClientError::Config(format!("invalid JSON format: {e}"))),
        _ => Err(ClientError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.toml", "config.json", "wren.toml", "wren.json"];
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for name in NAMES {
            candidates.push(cwd.join(name));
        }
        for name in NAMES {
            candidates.push(cwd.join("..").join(name));
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            for name in NAMES {
                candidates.push(exe_dir.join(name));
            }
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> ClientResult<String> {
    std::env::var(key)
        .map_err(|_| ClientError::Config(format!("missing required environment variable: {key}")))
}

/// Parse an optional numeric environment variable.
fn env_parse<T: std::str::FromStr>(key: &str) -> ClientResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ClientError::Config(format!("invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}
