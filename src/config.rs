use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::{GalleryError, Result};
use crate::gallery::DEFAULT_PAGE_SIZE;
use crate::viewport::{DEFAULT_LOOKAHEAD_ROWS, DEFAULT_THROTTLE};

pub const DEFAULT_BASE_URL: &str = "https://picsum.photos";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub throttle_ms: u64,
    pub lookahead_rows: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            throttle_ms: DEFAULT_THROTTLE.as_millis() as u64,
            lookahead_rows: DEFAULT_LOOKAHEAD_ROWS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("pixgrid").join("config.toml"))
}

impl Config {
    /// Load the user config, falling back to defaults when the file is
    /// missing or broken.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match Config::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring config file");
                Config::default()
            }
        }
    }

    /// Load an explicitly requested config file. Unlike [`Config::load`]
    /// this fails loudly.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GalleryError::Config(format!("{}: {}", path.display(), e)))?;
        Config::parse(&content)
            .map_err(|e| GalleryError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<Config>(content).map(Config::sanitized)
    }

    fn sanitized(mut self) -> Self {
        if self.api.page_size == 0 {
            warn!("page_size must be positive, using {}", DEFAULT_PAGE_SIZE);
            self.api.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.api.base_url.trim().is_empty() {
            self.api.base_url = DEFAULT_BASE_URL.to_string();
        }
        if self.api.timeout_secs == 0 {
            self.api.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.scroll.throttle_ms)
    }
}
