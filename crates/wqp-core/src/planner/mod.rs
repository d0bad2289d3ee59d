//! Partition planner.
//!
//! Turns a merged inventory into a partition assignment table:
//! filter -> group by site -> sort by descending result count ->
//! estimate partition count -> greedy smallest-bucket assignment.
//! Every retained site lands in exactly one partition and no partition
//! exceeds the site target.

mod assign;
mod count;
mod filter;

pub use assign::assign_greedy;
pub use count::{estimate, PartitionEstimate};
pub use filter::{apply as apply_filters, is_malformed_org, DropStats, FilterReport, FilterRules};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::inventory::InventoryRecord;

/// Per-partition targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Target maximum total result count per partition.
    pub target_max_results: u64,
    /// Target maximum number of sites per partition.
    pub target_max_sites: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            target_max_results: 250_000,
            target_max_sites: 500,
        }
    }
}

impl PartitionConfig {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.target_max_results == 0 {
            return Err(PlanError::InvalidConfig(
                "target_max_results must be at least 1".to_string(),
            ));
        }
        if self.target_max_sites == 0 {
            return Err(PlanError::InvalidConfig(
                "target_max_sites must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid partition config: {0}")]
    InvalidConfig(String),

    #[error("invalid pull date {0:?}: must be non-empty without whitespace")]
    InvalidPullDate(String),

    /// Summing result counts exceeded `u64`.
    #[error("result counts overflow a 64-bit total at site {site_id}")]
    ResultCountOverflow { site_id: String },

    /// The partition count was too small for the site target. Indicates a
    /// bad estimate, never silently worked around.
    #[error(
        "no partition has room for site {site_id}: {placed} placed, {remaining} remaining, \
         {partitions} partitions of at most {max_sites} sites"
    )]
    PartitionUnderProvisioned {
        site_id: String,
        placed: usize,
        remaining: usize,
        partitions: usize,
        max_sites: usize,
    },
}

/// Unit of partitioning: one site's full result count. Never split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicGroup {
    pub site_id: String,
    pub result_count: u64,
}

/// One row of the partition assignment table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionAssignment {
    pub site_id: String,
    pub result_count: u64,
    /// 1-based partition index.
    pub partition: usize,
    /// `{pull_date}_{partition:03}`.
    pub task_id: String,
    pub pull_date: String,
}

/// Totals for one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub partition: usize,
    pub task_id: String,
    pub sites: usize,
    pub results: u64,
}

/// Output of a planning run.
#[derive(Debug, Clone)]
pub struct PartitionPlan {
    /// Assignment rows ordered by partition, then by descending result count.
    pub assignments: Vec<PartitionAssignment>,
    pub partitions: Vec<PartitionSummary>,
    pub estimate: PartitionEstimate,
    pub filter: FilterReport,
}

/// Task identifier for a partition.
pub fn task_id(pull_date: &str, partition: usize) -> String {
    format!("{}_{:03}", pull_date, partition)
}

/// Merge rows sharing a site identifier, keeping first-occurrence order.
pub fn group_by_site(records: &[&InventoryRecord]) -> Result<Vec<AtomicGroup>, PlanError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    let mut groups: Vec<AtomicGroup> = Vec::with_capacity(records.len());
    for r in records {
        match index.get(r.site_id.as_str()) {
            Some(&i) => {
                let g = &mut groups[i];
                g.result_count = g.result_count.checked_add(r.result_count).ok_or_else(|| {
                    PlanError::ResultCountOverflow {
                        site_id: g.site_id.clone(),
                    }
                })?;
            }
            None => {
                index.insert(r.site_id.as_str(), groups.len());
                groups.push(AtomicGroup {
                    site_id: r.site_id.clone(),
                    result_count: r.result_count,
                });
            }
        }
    }
    Ok(groups)
}

/// Plan partitions for `records`.
///
/// Deterministic for a given input order: ties in result count keep their
/// input order, and ties in partition totals go to the lowest index.
pub fn plan_partitions(
    records: &[InventoryRecord],
    cfg: &PartitionConfig,
    pull_date: &str,
    rules: &FilterRules,
) -> Result<PartitionPlan, PlanError> {
    cfg.validate()?;
    if pull_date.is_empty() || pull_date.chars().any(char::is_whitespace) {
        return Err(PlanError::InvalidPullDate(pull_date.to_string()));
    }

    let (kept, filter) = filter::apply(records, rules);
    let mut groups = group_by_site(&kept)?;
    if groups.len() < kept.len() {
        tracing::debug!(
            rows = kept.len(),
            sites = groups.len(),
            "merged inventory rows sharing a site"
        );
    }
    // Stable: equal counts keep inventory order.
    groups.sort_by(|a, b| b.result_count.cmp(&a.result_count));

    let est = count::estimate(&groups, cfg)?;
    tracing::info!(
        sites = groups.len(),
        n_single = est.n_single,
        n_multi = est.n_multi,
        partitions = est.num_partitions,
        "estimated partition count"
    );

    let placement = assign::assign_greedy(&groups, est.num_partitions, cfg.target_max_sites)?;

    let mut partitions: Vec<PartitionSummary> = (1..=est.num_partitions)
        .map(|p| PartitionSummary {
            partition: p,
            task_id: task_id(pull_date, p),
            sites: 0,
            results: 0,
        })
        .collect();

    let mut assignments: Vec<PartitionAssignment> = Vec::with_capacity(groups.len());
    for (g, p) in groups.into_iter().zip(placement) {
        let summary = &mut partitions[p - 1];
        summary.sites += 1;
        // assign_greedy already bounded every partition total.
        summary.results = summary.results.saturating_add(g.result_count);
        assignments.push(PartitionAssignment {
            site_id: g.site_id,
            result_count: g.result_count,
            partition: p,
            task_id: summary.task_id.clone(),
            pull_date: pull_date.to_string(),
        });
    }
    assignments.sort_by_key(|a| a.partition);

    if let (Some(max), Some(min)) = (
        partitions.iter().map(|p| p.results).max(),
        partitions.iter().map(|p| p.results).min(),
    ) {
        tracing::info!(
            partitions = partitions.len(),
            sites = assignments.len(),
            largest = max,
            smallest = min,
            "planned partitions"
        );
    }

    Ok(PartitionPlan {
        assignments,
        partitions,
        estimate: est,
        filter,
    })
}
