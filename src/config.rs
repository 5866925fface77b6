use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub intrusion_detector: DetectorConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from default locations or create default
    pub fn load_or_default() -> Result<Self> {
        let paths = [
            PathBuf::from("/etc/ids-loader/config.toml"),
            dirs_next::config_dir()
                .map(|p| p.join("ids-loader/config.toml"))
                .unwrap_or_default(),
            PathBuf::from("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl GeneralConfig {
    /// Filter directive used when `RUST_LOG` is unset; blank means `info`
    pub fn log_directive(&self) -> &str {
        match self.log_level.trim() {
            "" => "info",
            level => level,
        }
    }
}

/// Intrusion detector assembly
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Explicit detector implementation type; the built-in detector when unset
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub detector_type: Option<String>,

    #[serde(default)]
    pub actions: ActionsConfig,

    #[serde(default)]
    pub event_thresholds: Vec<ThresholdConfig>,
}

impl DetectorConfig {
    /// Explicit detector type, if one is configured
    pub fn explicit_type(&self) -> Option<&str> {
        self.detector_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// Modules to scan for auto-load actions
    #[serde(default, alias = "assemblies")]
    pub modules: Vec<ModuleRef>,

    /// Actions registered by type under an explicit name
    #[serde(default, rename = "action")]
    pub actions: Vec<ActionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRef {
    /// Module name
    pub name: String,

    /// Wildcard over fully qualified type ids
    #[serde(default = "default_type_pattern")]
    pub types: String,
}

impl ModuleRef {
    pub fn new(name: &str, types: &str) -> Self {
        Self {
            name: name.to_string(),
            types: types.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// Registration name
    pub name: String,

    /// Fully qualified action type id
    #[serde(rename = "type")]
    pub action_type: String,
}

impl ActionEntry {
    pub fn new(name: &str, action_type: &str) -> Self {
        Self {
            name: name.to_string(),
            action_type: action_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Event name
    pub name: String,

    /// Occurrences required to fire
    pub count: u32,

    /// Counting window (seconds)
    pub interval: u64,

    /// Comma-separated action names
    #[serde(default)]
    pub actions: String,
}

impl ThresholdConfig {
    pub fn new(name: &str, count: u32, interval: u64, actions: &str) -> Self {
        Self {
            name: name.to_string(),
            count,
            interval,
            actions: actions.to_string(),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_type_pattern() -> String {
    "*".to_string()
}
