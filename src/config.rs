use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;
use crate::extract::inventory::DEFAULT_PAGE_SIZE;
use crate::extract::SourceKind;
use crate::model::DEFAULT_LABEL;

pub const DEFAULT_SOURCE_URL: &str = "http://www.steamcardexchange.net/index.php?inventory";
pub const DEFAULT_INVENTORY_URL: &str = "https://steamcommunity.com/inventory/{steam_id}/753/6?l=english";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3 * 60);
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid interval '{value}': {source}")]
    Interval {
        value: String,
        source: humantime::DurationError,
    },

    #[error("interval must be greater than zero")]
    ZeroInterval,

    #[error("inventory page_size must be greater than zero")]
    ZeroPageSize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source_kind: SourceKind,
    pub source_url: String,
    /// `None` means the platform data dir.
    pub db_path: Option<PathBuf>,
    pub label: String,
    pub interval: Duration,
    pub serve_addr: String,
    /// Inventory endpoint, `{steam_id}` is substituted.
    pub inventory_url: String,
    pub page_size: u32,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_kind: SourceKind::Page,
            source_url: DEFAULT_SOURCE_URL.to_string(),
            db_path: None,
            label: DEFAULT_LABEL.to_string(),
            interval: DEFAULT_INTERVAL,
            serve_addr: default_serve_addr(),
            inventory_url: DEFAULT_INVENTORY_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            verbose: false,
        }
    }
}

/// `0.0.0.0:$PORT`, falling back to 5000 when PORT is unset or not a number.
pub fn default_serve_addr() -> String {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    format!("0.0.0.0:{port}")
}

/// Config file location (~/.config/cardex/config.toml or platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "cardex").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    source: SourceSection,
    #[serde(default)]
    store: StoreSection,
    #[serde(default)]
    schedule: ScheduleSection,
    #[serde(default)]
    serve: ServeSection,
    #[serde(default)]
    inventory: InventorySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceSection {
    kind: Option<SourceKind>,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreSection {
    path: Option<PathBuf>,
    label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScheduleSection {
    interval: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServeSection {
    addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct InventorySection {
    url: Option<String>,
    page_size: Option<u32>,
}

impl Config {
    /// Load `path`, or the default config file if it exists. An explicit
    /// path that cannot be read is an error; a missing default is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Config::default()),
            },
        };

        if !required && !path.exists() {
            return Ok(Config::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text)?;
        let mut config = Config::default();

        if let Some(kind) = file.source.kind {
            config.source_kind = kind;
        }
        if let Some(url) = file.source.url {
            config.source_url = url;
        }
        config.db_path = file.store.path;
        if let Some(label) = file.store.label {
            config.label = label;
        }
        if let Some(interval) = file.schedule.interval {
            config.interval = parse_interval(&interval)?;
        }
        if let Some(addr) = file.serve.addr {
            config.serve_addr = addr;
        }
        if let Some(url) = file.inventory.url {
            config.inventory_url = url;
        }
        if let Some(page_size) = file.inventory.page_size {
            if page_size == 0 {
                return Err(ConfigError::ZeroPageSize);
            }
            config.page_size = page_size;
        }

        Ok(config)
    }

    /// Config file overlaid with the global command line flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::load(cli.config.as_deref())?;

        if let Some(db) = &cli.db {
            config.db_path = Some(db.clone());
        }
        if let Some(label) = &cli.label {
            config.label = label.clone();
        }
        config.verbose = cli.verbose;

        Ok(config)
    }

    /// Inventory endpoint for one Steam account.
    pub fn inventory_url_for(&self, steam_id: &str) -> String {
        self.inventory_url.replace("{steam_id}", steam_id)
    }
}

/// Parse a duration string such as "3m", "90s" or "1h 30m".
pub fn parse_interval(value: &str) -> Result<Duration, ConfigError> {
    let interval = humantime::parse_duration(value.trim()).map_err(|source| ConfigError::Interval {
        value: value.to_string(),
        source,
    })?;

    if interval.is_zero() {
        return Err(ConfigError::ZeroInterval);
    }
    Ok(interval)
}
