//! Client configuration for the run database connection.
//!
//! Layered: an optional config file under the user config dir, then
//! environment overrides. The resolved `Config` is turned into an explicit
//! HTTP client at startup; nothing reads connection settings ambiently after
//! that.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::XefindError;

pub const URL_ENV: &str = "XEFIND_RUNDB_URL";
pub const TOKEN_ENV: &str = "XEFIND_RUNDB_TOKEN";
pub const TIMEOUT_ENV: &str = "XEFIND_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// On-disk config shape (`~/.config/xefind/config.json`). All fields optional
/// so a partial file can still be layered with the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    rundb_url: Option<String>,
    #[serde(default)]
    rundb_token: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// Resolved connection settings for the run database API.
#[derive(Debug, Clone)]
pub struct Config {
    pub rundb_url: String,
    pub rundb_token: Option<String>,
    pub timeout: Duration,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    /// A missing URL after layering is a usage error, not a connection error:
    /// the tool never guessed at an endpoint.
    pub fn load() -> Result<Self, XefindError> {
        let file = load_config_file()?;

        let rundb_url = env_value(URL_ENV)
            .or(file.rundb_url)
            .ok_or_else(|| {
                XefindError::usage(format!(
                    "run database URL not configured (set {URL_ENV} or rundb_url in {})",
                    config_path_display()
                ))
            })?;

        let rundb_token = env_value(TOKEN_ENV).or(file.rundb_token);

        let timeout_secs = match env_value(TIMEOUT_ENV) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                XefindError::usage(format!("{TIMEOUT_ENV} must be a number of seconds, got {raw:?}"))
            })?,
            None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            rundb_url,
            rundb_token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("xefind").join("config.json"))
}

fn config_path_display() -> String {
    config_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "~/.config/xefind/config.json".to_string())
}

fn load_config_file() -> Result<ConfigFile, XefindError> {
    let Some(path) = config_path() else {
        return Ok(ConfigFile::default());
    };
    if !path.is_file() {
        return Ok(ConfigFile::default());
    }
    let bytes = fs::read(&path)
        .map_err(|err| XefindError::usage(format!("cannot read config {}: {err}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| XefindError::usage(format!("malformed config {}: {err}", path.display())))
}
