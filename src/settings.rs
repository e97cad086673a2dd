use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{BillError, Result};

pub const DATA_DIR_ENV: &str = "BILLFOLD_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub extractor_url: String,
    /// Name of the environment variable holding the extraction API token.
    #[serde(default = "default_token_env")]
    pub extractor_token_env: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_token_env() -> String {
    "BILLFOLD_API_TOKEN".to_string()
}

fn default_currency_symbol() -> String {
    "¥".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            extractor_url: String::new(),
            extractor_token_env: default_token_env(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl Settings {
    /// The token for the extraction service, if its variable is set.
    pub fn extractor_token(&self) -> Option<String> {
        std::env::var(&self.extractor_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("billfold")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("billfold")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| BillError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Data directory from `BILLFOLD_DATA_DIR`, falling back to the settings file.
pub fn get_data_dir() -> PathBuf {
    resolve_data_dir(std::env::var(DATA_DIR_ENV).ok(), &load_settings())
}

fn resolve_data_dir(env_override: Option<String>, settings: &Settings) -> PathBuf {
    match env_override.filter(|d| !d.trim().is_empty()) {
        Some(dir) => PathBuf::from(shellexpand_path(&dir)),
        None => PathBuf::from(shellexpand_path(&settings.data_dir)),
    }
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
