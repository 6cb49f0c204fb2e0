use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::{Result, TrackerError};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_PER_PAGE: u32 = 30;
/// GitHub rejects larger `per_page` values.
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub per_page: u32,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            user_agent: concat!("repo-tracker/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 250 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("repo-tracker").join("config.toml"))
}

impl Config {
    /// Load from `path`, or the default location when `None`.
    /// A missing or unparsable file yields the defaults; an unreadable
    /// explicit path is logged.
    pub fn load(path: Option<&Path>) -> Self {
        let explicit = path.is_some();
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match config_path() {
                Some(p) => p,
                None => return Config::default(),
            },
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                // Only a file the user named is worth a warning
                if explicit {
                    tracing::warn!(path = %path.display(), "cannot read config, using defaults: {}", e);
                }
                return Config::default();
            }
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config.normalized(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring invalid config: {}", e);
                Config::default()
            }
        }
    }

    /// Command-line values win over the file.
    pub fn apply_cli(mut self, cli: &Cli) -> Result<Self> {
        if let Some(url) = &cli.api_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(TrackerError::Config(format!(
                    "--api-url must be an http(s) URL, got {}",
                    url
                )));
            }
            self.api.base_url = url.clone();
        }
        if let Some(per_page) = cli.per_page {
            if per_page == 0 || per_page > MAX_PER_PAGE {
                return Err(TrackerError::Config(format!(
                    "--per-page must be between 1 and {}",
                    MAX_PER_PAGE
                )));
            }
            self.api.per_page = per_page;
        }
        Ok(self)
    }

    fn normalized(mut self) -> Self {
        self.api.per_page = self.api.per_page.clamp(1, MAX_PER_PAGE);
        if self.api.base_url.trim().is_empty() {
            self.api.base_url = DEFAULT_BASE_URL.to_string();
        }
        if self.ui.tick_rate_ms == 0 {
            self.ui.tick_rate_ms = UiConfig::default().tick_rate_ms;
        }
        self
    }
}
