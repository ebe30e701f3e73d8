use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use warden_policy::{parse_settings, HostLimits, PolicyConfig};

pub const DEFAULT_CONFIG_PATH: &str = "warden.yaml";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// The site's own installation tree; discovery covers its parent minus this.
    pub protected_root: PathBuf,
    #[serde(default = "default_state_db")]
    pub state_db: PathBuf,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Raw settings blob kept by the hosting platform, if any.
    #[serde(default)]
    pub settings_file: Option<PathBuf>,
    /// Inline settings; these win over `settings_file`.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

fn default_state_db() -> PathBuf {
    PathBuf::from("warden-state.db")
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Settings from `settings_file` overlaid with the inline ones.
    pub fn raw_settings(&self) -> Result<Map<String, Value>> {
        let mut raw = match &self.settings_file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                parse_settings(&content)
                    .with_context(|| format!("Invalid settings in {}", path.display()))?
            }
            None => Map::new(),
        };
        raw.extend(self.settings.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(raw)
    }

    pub fn policy(&self, host: &HostLimits) -> Result<PolicyConfig> {
        Ok(PolicyConfig::merge(host, &self.raw_settings()?))
    }
}
