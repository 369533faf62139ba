// Configuration loading and parsing (config/bsmstats.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/bsmstats.toml";

const DEFAULT_BASE_URL: &str = "https://bsm.baseball-softball.de";
const DEFAULT_CLUB_ID: u32 = 492;
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_USER_AGENT: &str = concat!("bsmstats/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub transport: TransportConfig,
}

/// Where the statistics feed lives and which club roster to load.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub club_id: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            club_id: DEFAULT_CLUB_ID,
        }
    }
}

/// HTTP settings for the JSON transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Try the feed URL itself before any proxy.
    pub direct: bool,
    /// Fallback proxies, tried in order after the direct route.
    pub proxies: Vec<ProxyRoute>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.into(),
            direct: true,
            proxies: Vec::new(),
        }
    }
}

/// A relay that receives the target URL in a query parameter,
/// e.g. `https://api.allorigins.win/raw?url=<target>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyRoute {
    pub base_url: String,
    #[serde(default = "default_proxy_param")]
    pub param: String,
}

fn default_proxy_param() -> String {
    "url".into()
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from an explicit file path.
///
/// Unlike [`load_config_from`], a missing file is an error here: the caller
/// asked for this specific file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load `config/bsmstats.toml` relative to `base_dir`, falling back to the
/// built-in defaults when the file does not exist.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join(DEFAULT_CONFIG_PATH);
    if !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }
    load_config_file(&path)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if !is_http_url(&config.source.base_url) {
        return Err(ConfigError::ValidationError {
            field: "source.base_url".into(),
            message: format!("must be an http(s) URL, got `{}`", config.source.base_url),
        });
    }

    if config.source.club_id == 0 {
        return Err(ConfigError::ValidationError {
            field: "source.club_id".into(),
            message: "must be greater than 0".into(),
        });
    }

    let transport = &config.transport;
    if transport.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "transport.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if !transport.direct && transport.proxies.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "transport".into(),
            message: "direct access is disabled and no proxies are configured".into(),
        });
    }

    for (i, proxy) in transport.proxies.iter().enumerate() {
        if !is_http_url(&proxy.base_url) {
            return Err(ConfigError::ValidationError {
                field: format!("transport.proxies[{i}].base_url"),
                message: format!("must be an http(s) URL, got `{}`", proxy.base_url),
            });
        }
        if proxy.param.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("transport.proxies[{i}].param"),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
