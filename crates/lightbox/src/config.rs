use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use fusion_runtime::DEFAULT_TAB_ORDER;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub compute: ComputeConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_app_dir")]
    pub app_dir: String,

    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    #[serde(default = "default_outputs_dir")]
    pub outputs_dir: String,

    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: String,

    #[serde(default = "default_modules_dir")]
    pub modules_dir: String,

    #[serde(default = "default_settings_file")]
    pub settings_file: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ComputeConfig {
    #[serde(default = "default_compute_url")]
    pub url: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default = "default_tab_order")]
    pub tab_order: Vec<String>,
}

fn default_app_dir() -> String {
    ".".to_string()
}

fn default_models_dir() -> String {
    "./models".to_string()
}

fn default_outputs_dir() -> String {
    "./outputs".to_string()
}

fn default_workflows_dir() -> String {
    "./workflows".to_string()
}

fn default_modules_dir() -> String {
    "./modules".to_string()
}

fn default_settings_file() -> String {
    "./ui_settings.json".to_string()
}

fn default_compute_url() -> String {
    "http://127.0.0.1:8188".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_tab_order() -> Vec<String> {
    DEFAULT_TAB_ORDER.iter().map(|s| s.to_string()).collect()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
            models_dir: default_models_dir(),
            outputs_dir: default_outputs_dir(),
            workflows_dir: default_workflows_dir(),
            modules_dir: default_modules_dir(),
            settings_file: default_settings_file(),
        }
    }
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            url: default_compute_url(),
            enabled: default_enabled(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tab_order: default_tab_order(),
        }
    }
}

/// Expand `~` in a configured path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// Load config from file or use defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}
