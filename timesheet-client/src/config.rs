use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_URL_VAR: &str = "TIMESHEET_API_URL";
pub const COSTS_API_URL_VAR: &str = "TIMESHEET_COSTS_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the timesheet backend, e.g. "http://localhost:8080"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Base URL of the cost service, including its `/api` prefix
    #[serde(default = "default_costs_api_url")]
    pub costs_api_url: String,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_costs_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            costs_api_url: default_costs_api_url(),
        }
    }
}

pub(crate) fn config_root() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Cannot determine config directory")?
        .join("timesheet"))
}

impl ClientConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(config_root()?.join("config.toml"))
    }

    /// Config file, then `.env`, then environment. Missing file means defaults.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        // A missing .env file is fine.
        dotenvy::dotenv().ok();
        Ok(config.with_overrides(|name| std::env::var(name).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Replaces URLs with the non-empty values `lookup` returns for
    /// [`API_URL_VAR`] and [`COSTS_API_URL_VAR`].
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(API_URL_VAR) {
            self.api_url = url;
        }
        if let Some(url) = non_empty(COSTS_API_URL_VAR) {
            self.costs_api_url = url;
        }
        self
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.costs_api_url, "http://localhost:8080/api");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"https://hours.example.com\"\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://hours.example.com");
        assert_eq!(config.costs_api_url, "http://localhost:8080/api");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timesheet").join("config.toml");
        let config = ClientConfig {
            api_url: "http://a".to_string(),
            costs_api_url: "http://b/api".to_string(),
        };
        config.save_to(&path).unwrap();
        assert_eq!(ClientConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = [").unwrap();
        assert!(ClientConfig::load_from(&path).is_err());
    }

    #[test]
    fn environment_overrides_urls() {
        let config = ClientConfig::default().with_overrides(|name| match name {
            API_URL_VAR => Some("https://api.example.com".to_string()),
            COSTS_API_URL_VAR => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.costs_api_url, "http://localhost:8080/api");
    }
}
