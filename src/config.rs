//! Client configuration.
//!
//! Every field has a default matching the production service, so an empty
//! file (or [`Config::default`]) is a valid configuration. Overrides exist
//! mainly for tests and for pointing at a recording proxy.
//!
//! ```toml
//! [service]
//! base_url = "https://notebooklm.google.com"
//! upload_url = "https://upload.notebooklm.google.com/upload/notebooklm/v1/sources"
//! login_url = "https://accounts.google.com"
//!
//! [auth]
//! storage_path = "/home/me/.notebooklm/storage_state.json"
//!
//! [timeouts]
//! token_fetch_secs = 30
//! negotiate_secs = 60
//! transfer_secs = 300
//!
//! [upload]
//! chunk_size = 65536
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Landing page; also the `Origin`/`Referer` of upload requests.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    /// Identity provider. Landing here after redirects means the session
    /// expired.
    #[serde(default = "default_login_url")]
    pub login_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_url: default_upload_url(),
            login_url: default_login_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://notebooklm.google.com".to_string()
}
fn default_upload_url() -> String {
    "https://upload.notebooklm.google.com/upload/notebooklm/v1/sources".to_string()
}
fn default_login_url() -> String {
    "https://accounts.google.com".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    #[serde(default = "default_token_fetch_secs")]
    pub token_fetch_secs: u64,
    #[serde(default = "default_negotiate_secs")]
    pub negotiate_secs: u64,
    #[serde(default = "default_transfer_secs")]
    pub transfer_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            token_fetch_secs: default_token_fetch_secs(),
            negotiate_secs: default_negotiate_secs(),
            transfer_secs: default_transfer_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn token_fetch(&self) -> Duration {
        Duration::from_secs(self.token_fetch_secs)
    }
    pub fn negotiate(&self) -> Duration {
        Duration::from_secs(self.negotiate_secs)
    }
    pub fn transfer(&self) -> Duration {
        Duration::from_secs(self.transfer_secs)
    }
}

fn default_token_fetch_secs() -> u64 {
    30
}
fn default_negotiate_secs() -> u64 {
    60
}
fn default_transfer_secs() -> u64 {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Bytes read from disk per streamed chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    64 * 1024
}

impl Config {
    /// The storage-state file to read cookies from: the configured path, or
    /// `~/.notebooklm/storage_state.json`.
    pub fn storage_path(&self) -> PathBuf {
        self.auth
            .storage_path
            .clone()
            .unwrap_or_else(default_storage_path)
    }
}

/// `~/.notebooklm/storage_state.json`, falling back to the working
/// directory when no home directory is known.
pub fn default_storage_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".notebooklm")
        .join("storage_state.json")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    for (field, value) in [
        ("service.base_url", &config.service.base_url),
        ("service.upload_url", &config.service.upload_url),
        ("service.login_url", &config.service.login_url),
    ] {
        let url = Url::parse(value).with_context(|| format!("{field} is not a valid URL"))?;
        if url.host_str().is_none() {
            bail!("{field} must include a host: '{value}'");
        }
    }

    if config.timeouts.token_fetch_secs == 0
        || config.timeouts.negotiate_secs == 0
        || config.timeouts.transfer_secs == 0
    {
        bail!("timeouts must be > 0 seconds");
    }

    if config.upload.chunk_size == 0 {
        bail!("upload.chunk_size must be > 0");
    }

    Ok(())
}
