//! Inventory rows and the query shape used to request them.
//!
//! An inventory is the catalog of result counts per monitoring site, gathered
//! before any results are actually retrieved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the inventory: a monitoring site and how many results it holds
/// for the requested characteristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub org_id: String,
    pub site_id: String,
    /// Resolved site-type name (e.g. "Stream", "Well").
    pub site_type: String,
    /// State-level name as reported by the source.
    pub region_name: String,
    /// County-level name as reported by the source.
    pub sub_region_name: String,
    /// Eight-digit hydrologic unit code; empty when the source has none.
    pub huc: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub result_count: u64,
}

/// Geographic scope of a single remote query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// Whole region, e.g. `US:55`.
    Region(String),
    /// Explicit list of sub-region (county) codes, e.g. `US:55:001`.
    SubRegions(Vec<String>),
}

impl QueryScope {
    /// Short human-readable label for logs.
    pub fn describe(&self) -> String {
        match self {
            QueryScope::Region(code) => code.clone(),
            QueryScope::SubRegions(codes) => match (codes.first(), codes.last()) {
                (Some(first), Some(last)) if codes.len() > 1 => {
                    format!("{} sub-regions {}..{}", codes.len(), first, last)
                }
                (Some(only), _) => only.clone(),
                _ => "no sub-regions".to_string(),
            },
        }
    }
}

/// A fully-specified inventory query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryQuery {
    /// Flattened characteristic names (all synonym groups).
    pub characteristics: Vec<String>,
    pub scope: QueryScope,
    /// Ancillary query parameters passed through to the source unchanged.
    pub params: BTreeMap<String, String>,
}

impl InventoryQuery {
    /// Same query, different scope.
    pub fn with_scope(&self, scope: QueryScope) -> Self {
        Self {
            characteristics: self.characteristics.clone(),
            scope,
            params: self.params.clone(),
        }
    }
}
