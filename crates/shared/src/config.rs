//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Jira connection configuration.
    pub jira: JiraConfig,
    /// Transfer limits and defaults.
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Jira connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraConfig {
    /// Base URL of the Jira instance.
    pub url: String,
    /// Username for basic authentication (Jira Cloud email).
    #[serde(default)]
    pub username: Option<String>,
    /// API token paired with `username`.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Personal access token (Server/Data Center), sent as a bearer token.
    #[serde(default)]
    pub personal_token: Option<String>,
    /// Verify TLS certificates.
    #[serde(default = "default_ssl_verify")]
    pub ssl_verify: bool,
    /// Connect and per-read timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ssl_verify() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    75
}

/// Transfer limits and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    /// Default directory for downloaded attachments.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    /// Maximum size of a single streamed chunk in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Only inline `image/*` attachments by default.
    #[serde(default = "default_only_images")]
    pub only_images: bool,
    /// Default cap on inlined attachments per issue.
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,
    /// Default cap on bytes read per inlined attachment.
    #[serde(default = "default_max_bytes_per_attachment")]
    pub max_bytes_per_attachment: usize,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_chunk_size() -> usize {
    8192
}

fn default_only_images() -> bool {
    true
}

fn default_max_attachments() -> usize {
    5
}

fn default_max_bytes_per_attachment() -> usize {
    1_000_000 // ~1 MB
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            chunk_size: default_chunk_size(),
            only_images: default_only_images(),
            max_attachments: default_max_attachments(),
            max_bytes_per_attachment: default_max_bytes_per_attachment(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `FERRY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FERRY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
