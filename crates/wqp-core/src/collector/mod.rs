//! Adaptive inventory collector.
//!
//! Queries the remote source for a whole region at once. When that broad
//! query fails, the region's sub-regions are split into two halves by count
//! and queried separately; the halves are concatenated without deduplication.
//! Splitting is limited to [`MAX_SPLIT_DEPTH`] levels: a failing sub-region
//! query is fatal for the region.

mod error;
mod split;

pub use error::CollectError;
pub use split::halve;

use std::time::{Duration, Instant};

use crate::config::PullConfig;
use crate::inventory::{InventoryQuery, InventoryRecord, QueryScope};
use crate::region::RegionCatalog;
use crate::source::{RemoteSource, SourceError};

/// How many times a failing scope may be split before the failure is final.
pub const MAX_SPLIT_DEPTH: u32 = 1;

/// Inventory gathered for one region.
#[derive(Debug, Clone)]
pub struct RegionInventory {
    pub region: String,
    pub records: Vec<InventoryRecord>,
    /// Wall-clock time of the successful queries (sum over halves when split).
    pub elapsed: Duration,
    pub rows: usize,
    /// True when the broad query failed and sub-region halves were used.
    pub split: bool,
}

/// Build the broad query for `region` from the pull parameters.
pub fn region_query(region: &str, pull: &PullConfig) -> InventoryQuery {
    InventoryQuery {
        characteristics: pull.flattened_characteristics(),
        scope: QueryScope::Region(region.to_string()),
        params: pull.params.clone(),
    }
}

/// Collect the inventory for one region, splitting once on failure.
pub fn collect_region<S, C>(
    source: &S,
    catalog: &C,
    region: &str,
    pull: &PullConfig,
) -> Result<RegionInventory, CollectError>
where
    S: RemoteSource + ?Sized,
    C: RegionCatalog + ?Sized,
{
    let query = region_query(region, pull);
    let fetched = fetch_scope(source, catalog, region, &query, 0)?;
    let rows = fetched.records.len();

    tracing::info!(
        region,
        rows,
        elapsed_secs = fetched.elapsed.as_secs_f64(),
        split = fetched.split,
        "retrieved {} inventory rows for {} in {:.1}s",
        rows,
        region,
        fetched.elapsed.as_secs_f64()
    );

    Ok(RegionInventory {
        region: region.to_string(),
        records: fetched.records,
        elapsed: fetched.elapsed,
        rows,
        split: fetched.split,
    })
}

/// Collect several regions one after another. Each region's outcome is
/// independent; a failure in one does not stop the rest.
pub fn collect_regions<S, C>(
    source: &S,
    catalog: &C,
    regions: &[String],
    pull: &PullConfig,
) -> Vec<(String, Result<RegionInventory, CollectError>)>
where
    S: RemoteSource + ?Sized,
    C: RegionCatalog + ?Sized,
{
    regions
        .iter()
        .map(|region| {
            let outcome = collect_region(source, catalog, region, pull);
            if let Err(e) = &outcome {
                tracing::error!(region = %region, "inventory failed: {}", e);
            }
            (region.clone(), outcome)
        })
        .collect()
}

struct Fetched {
    records: Vec<InventoryRecord>,
    elapsed: Duration,
    split: bool,
}

fn fetch_scope<S, C>(
    source: &S,
    catalog: &C,
    region: &str,
    query: &InventoryQuery,
    depth: u32,
) -> Result<Fetched, CollectError>
where
    S: RemoteSource + ?Sized,
    C: RegionCatalog + ?Sized,
{
    let start = Instant::now();
    let err = match source.query(query) {
        Ok(records) => {
            let elapsed = start.elapsed();
            tracing::debug!(
                region,
                scope = %query.scope.describe(),
                rows = records.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "inventory query succeeded"
            );
            return Ok(Fetched {
                records,
                elapsed,
                split: false,
            });
        }
        Err(e) => e,
    };

    if depth >= MAX_SPLIT_DEPTH {
        return Err(failure(region, &query.scope, err));
    }

    let parts = match &query.scope {
        QueryScope::Region(code) => match catalog.sub_regions(code) {
            Some(subs) => subs,
            None => {
                return Err(CollectError::UnknownRegion {
                    region: region.to_string(),
                    source: err,
                })
            }
        },
        QueryScope::SubRegions(codes) => codes.as_slice(),
    };
    let splittable = match &query.scope {
        QueryScope::Region(_) => !parts.is_empty(),
        QueryScope::SubRegions(_) => parts.len() >= 2,
    };
    if !splittable {
        return Err(failure(region, &query.scope, err));
    }

    tracing::warn!(
        region,
        scope = %query.scope.describe(),
        sub_regions = parts.len(),
        "inventory query failed ({}); splitting into two halves",
        err
    );

    let (first, second) = halve(parts);
    let mut merged = Fetched {
        records: Vec::new(),
        elapsed: Duration::ZERO,
        split: true,
    };
    for half in [first, second] {
        if half.is_empty() {
            continue;
        }
        let sub_query = query.with_scope(QueryScope::SubRegions(half));
        let part = fetch_scope(source, catalog, region, &sub_query, depth + 1)?;
        merged.records.extend(part.records);
        merged.elapsed += part.elapsed;
    }
    Ok(merged)
}

fn failure(region: &str, scope: &QueryScope, source: SourceError) -> CollectError {
    match scope {
        QueryScope::Region(_) => CollectError::RemoteQueryFailure {
            region: region.to_string(),
            source,
        },
        QueryScope::SubRegions(_) => CollectError::RemoteQuerySubFailure {
            region: region.to_string(),
            scope: scope.describe(),
            source,
        },
    }
}

#[cfg(test)]
mod tests;
