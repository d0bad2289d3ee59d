//! Region reference data.
//!
//! A region is a state-level scope (e.g. `US:55`) with its county-level
//! sub-region codes (e.g. `US:55:001`). The table is loaded once from a TOML
//! file and never mutated; the collector only reads it when a broad query has
//! to be split.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One region and its sub-region codes, in reference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub counties: Vec<String>,
}

/// Lookup of sub-region codes by region code.
pub trait RegionCatalog {
    /// Sub-region codes of `region`, or `None` if the region is unknown.
    fn sub_regions(&self, region: &str) -> Option<&[String]>;
}

#[derive(Debug, Deserialize)]
struct RegionFile {
    #[serde(default)]
    region: Vec<Region>,
}

/// In-memory region table that preserves file order.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: Vec<Region>,
    index: HashMap<String, usize>,
}

impl RegionTable {
    /// Build a table; duplicate region codes are rejected.
    pub fn new(regions: Vec<Region>) -> Result<Self> {
        let mut index = HashMap::with_capacity(regions.len());
        for (i, r) in regions.iter().enumerate() {
            if index.insert(r.code.clone(), i).is_some() {
                anyhow::bail!("duplicate region code in reference table: {}", r.code);
            }
        }
        Ok(Self { regions, index })
    }

    /// Parse a table from TOML text (`[[region]]` entries).
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let file: RegionFile = toml::from_str(data).context("failed to parse region table")?;
        Self::new(file.region)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read region table: {}", path.display()))?;
        let table = Self::from_toml_str(&data)
            .with_context(|| format!("invalid region table: {}", path.display()))?;
        tracing::debug!(
            regions = table.len(),
            path = %path.display(),
            "loaded region table"
        );
        Ok(table)
    }

    pub fn get(&self, code: &str) -> Option<&Region> {
        self.index.get(code).map(|&i| &self.regions[i])
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn codes(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.code.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl RegionCatalog for RegionTable {
    fn sub_regions(&self, region: &str) -> Option<&[String]> {
        self.get(region).map(|r| r.counties.as_slice())
    }
}
