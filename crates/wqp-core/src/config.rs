use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::planner::PartitionConfig;

/// One characteristic and the names the remote source may know it by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicGroup {
    pub name: String,
    pub synonyms: Vec<String>,
}

/// What to pull: characteristic synonym groups, site types to drop, and
/// ancillary parameters passed to every remote query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullConfig {
    #[serde(default)]
    pub characteristics: Vec<CharacteristicGroup>,
    /// Resolved site-type names removed before partitioning.
    #[serde(default)]
    pub excluded_site_types: Vec<String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl PullConfig {
    /// All synonyms of all groups, in configured order.
    pub fn flattened_characteristics(&self) -> Vec<String> {
        self.characteristics
            .iter()
            .flat_map(|g| g.synonyms.iter().cloned())
            .collect()
    }
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            characteristics: vec![
                CharacteristicGroup {
                    name: "temperature".to_string(),
                    synonyms: vec![
                        "Temperature, water".to_string(),
                        "Temperature".to_string(),
                        "Temperature, water, deg F".to_string(),
                    ],
                },
                CharacteristicGroup {
                    name: "conductivity".to_string(),
                    synonyms: vec![
                        "Specific conductance".to_string(),
                        "Conductivity".to_string(),
                    ],
                },
            ],
            excluded_site_types: vec![
                "Aggregate groundwater use".to_string(),
                "Atmosphere".to_string(),
                "Well".to_string(),
                "Subsurface".to_string(),
                "Land".to_string(),
            ],
            params: BTreeMap::new(),
        }
    }
}

/// Remote station-summary service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    /// Connection establishment timeout. Transfers themselves are not bounded.
    pub connect_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.waterqualitydata.us/data/Station/search".to_string(),
            connect_timeout_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/wqp/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WqpConfig {
    /// Region reference table; defaults to `regions.toml` next to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions_path: Option<PathBuf>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub pull: PullConfig,
    #[serde(default)]
    pub partition: PartitionConfig,
}

impl WqpConfig {
    /// Region table location: explicit setting, else XDG config dir.
    pub fn resolve_regions_path(&self) -> Result<PathBuf> {
        match &self.regions_path {
            Some(p) => Ok(p.clone()),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("wqp")?;
                Ok(xdg_dirs.get_config_home().join("regions.toml"))
            }
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wqp")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WqpConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WqpConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit path (no default file is created).
pub fn load_from_path(path: &Path) -> Result<WqpConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: WqpConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    Ok(cfg)
}
