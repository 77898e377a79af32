use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/friendly_chat.json";
pub const DEFAULT_MSG_LENGTH_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the feed database and uploaded blobs. Clients that
    /// share it see each other's messages.
    pub data_dir: PathBuf,
    /// Where this client keeps its signed-in identity. Defaults to the user's
    /// config directory, outside the shared data directory.
    pub identity_file: Option<PathBuf>,
    /// Feed path messages are pushed to and read from.
    pub feed_path: String,
    /// Blob bucket folder photos are uploaded into.
    pub photos_path: String,
    pub poll_interval_ms: u64,
    pub max_message_length: usize,
    pub window_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            identity_file: None,
            feed_path: "messages".to_string(),
            photos_path: "Photos".to_string(),
            poll_interval_ms: 500,
            max_message_length: DEFAULT_MSG_LENGTH_LIMIT,
            window_title: "Friendly Chat".to_string(),
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(50))
    }

    pub fn feed_db_path(&self) -> PathBuf {
        self.data_dir.join("feed.db")
    }

    pub fn blob_root(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    pub fn identity_path(&self) -> PathBuf {
        if let Some(path) = &self.identity_file {
            return path.clone();
        }
        dirs::config_dir()
            .unwrap_or_else(|| self.data_dir.clone())
            .join("friendly_chat")
            .join("identity.json")
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}
