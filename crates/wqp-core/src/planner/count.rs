//! Partition-count estimate.

use super::{AtomicGroup, PartitionConfig, PlanError};

/// How many partitions the plan needs, and why.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionEstimate {
    /// Groups at or above the result target; each needs its own partition.
    pub n_single: usize,
    /// Partitions shared by the remaining groups.
    pub n_multi: usize,
    pub remaining_total: u64,
    pub remaining_sites: usize,
    /// `n_single + n_multi`, never less than 1.
    pub num_partitions: usize,
}

/// Estimate partitions from result volume and site count.
///
/// `n_multi` is the larger of `ceil(remaining_total / target_max_results)`
/// and `ceil(remaining_sites / target_max_sites)`. Targets must be non-zero.
/// Fails if the remaining result total does not fit in a `u64`.
pub fn estimate(
    groups: &[AtomicGroup],
    cfg: &PartitionConfig,
) -> Result<PartitionEstimate, PlanError> {
    let mut n_single = 0usize;
    let mut remaining_total = 0u64;
    let mut remaining_sites = 0usize;

    for g in groups {
        if g.result_count >= cfg.target_max_results {
            n_single += 1;
        } else {
            remaining_total = remaining_total.checked_add(g.result_count).ok_or_else(|| {
                PlanError::ResultCountOverflow {
                    site_id: g.site_id.clone(),
                }
            })?;
            remaining_sites += 1;
        }
    }

    let by_volume = remaining_total.div_ceil(cfg.target_max_results) as usize;
    let by_sites = remaining_sites.div_ceil(cfg.target_max_sites);
    let n_multi = by_volume.max(by_sites);

    Ok(PartitionEstimate {
        n_single,
        n_multi,
        remaining_total,
        remaining_sites,
        num_partitions: (n_single + n_multi).max(1),
    })
}
