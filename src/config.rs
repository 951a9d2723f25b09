use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ORG_ENV: &str = "JIRA_ALFRED_ORG";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Atlassian cloud subdomain, e.g. `acme` for `acme.atlassian.net`.
    pub org: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub default_icon: Option<PathBuf>,
    /// Append the sprint/account tags to each item's search text.
    #[serde(default)]
    pub match_tags: bool,
    /// SVG to PNG converter, program followed by its arguments.
    pub rasterizer: Option<Vec<String>>,
}

impl AppConfig {
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "org" => self.org.clone(),
            "cache_dir" => Some(self.cache_dir().to_string_lossy().into_owned()),
            "default_icon" => Some(self.default_icon().to_string_lossy().into_owned()),
            "match_tags" => Some(self.match_tags.to_string()),
            _ => None,
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("icons"))
    }

    pub fn default_icon(&self) -> PathBuf {
        self.default_icon
            .clone()
            .unwrap_or_else(|| PathBuf::from("./icon.png"))
    }

    pub fn rasterizer_command(&self) -> (String, Vec<String>) {
        match self.rasterizer.as_deref() {
            Some([program, args @ ..]) => (program.clone(), args.to_vec()),
            _ => ("rsvg-convert".into(), vec!["--format=png".into()]),
        }
    }

    /// Environment overrides, applied after the file is read.
    fn apply_env(&mut self) {
        if let Ok(org) = std::env::var(ORG_ENV) {
            if !org.trim().is_empty() {
                self.org = Some(org.trim().to_string());
            }
        }
    }
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jira-alfred")
}

pub fn load_config() -> Result<AppConfig> {
    let mut config = load_config_from(&config_path())?;
    config.apply_env();
    Ok(config)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}
