//! Configuration: an optional TOML file, overridden by command-line/env values.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;

use crate::backend;
use crate::theme::Theme;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_THEME: Theme = Theme::Dracula;

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub theme: Option<String>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub theme: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub theme: Theme,
}

impl Config {
    /// Merges sources with precedence overrides > file > defaults and validates the result.
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let raw_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url =
            backend::parse_base_url(&raw_url).with_context(|| format!("Invalid base URL '{}'", raw_url))?;

        let theme = match overrides.theme.or(file.theme) {
            Some(name) => Theme::from_str(&name).map_err(anyhow::Error::msg)?,
            None => DEFAULT_THEME,
        };

        Ok(Self { base_url, theme })
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "faq-assistant", "faq-assistant-tui")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

/// Reads `path`. A missing file is an empty configuration.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
