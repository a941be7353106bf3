use crate::app_paths::AppPaths;
use crate::config::client::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Settings for the `slotmachine` command, stored as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Used when neither `--api-key` nor `APIVERVE_API_KEY` is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub base_url: String,

    pub timeout_secs: u64,

    /// Retries on network failures, capped at 3
    pub max_retries: u32,

    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Show the reel symbols column in the spin table
    pub show_reels: bool,

    /// Maximum spins printed in the table; the summary always covers all of them
    pub max_rows: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 0,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_reels: true,
            max_rows: 100,
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults when
    /// no file exists yet.
    pub fn load() -> Result<Self> {
        let path = AppPaths::config_file()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = toml::from_str(&contents)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Like [`load`](Self::load), but an unreadable or malformed file only
    /// produces a warning so flags and environment variables still work.
    pub fn load_or_default() -> Self {
        match AppPaths::config_file() {
            Ok(path) => Self::load_or_default_from(&path),
            Err(e) => {
                warn!(target: "slotmachine", "{e:#}; using default settings");
                Self::default()
            }
        }
    }

    pub fn load_or_default_from(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!(target: "slotmachine", "{e:#}; using default settings");
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Client builder seeded from these settings. The caller still supplies
    /// the key if the file has none.
    pub fn client_builder(&self) -> ClientConfigBuilder {
        let mut builder = ClientConfigBuilder::default()
            .base_url(self.api.base_url.clone())
            .timeout(Duration::from_secs(self.api.timeout_secs))
            .max_retries(self.api.max_retries)
            .retry_delay(Duration::from_millis(self.api.retry_delay_ms));
        if let Some(key) = &self.api.api_key {
            builder = builder.api_key(key.clone());
        }
        builder
    }

    pub fn client_config(&self) -> crate::error::ClientResult<ClientConfig> {
        self.client_builder().build()
    }

    pub fn create_default_with_comments() -> String {
        r#"# Slot Machine Simulator client configuration
# Location: ~/.config/slotmachine/config.toml (Linux)
#           ~/Library/Application Support/slotmachine/config.toml (macOS)
#           %APPDATA%\slotmachine\config.toml (Windows)

[api]
# API key from https://apiverve.com
# --api-key and APIVERVE_API_KEY take precedence over this value
# api_key = "your-api-key"

# Endpoint root; the resource path "slotmachine" is appended
base_url = "https://api.apiverve.com/v1"

# Whole-request timeout in seconds
timeout_secs = 30

# Retry attempts on network failures (0-3). HTTP errors are never retried
max_retries = 0

# Delay between retry attempts in milliseconds
retry_delay_ms = 1000

[display]
# Show the reel symbols for every spin
show_reels = true

# Maximum number of spins listed in the table
max_rows = 100
"#
        .to_string()
    }
}
