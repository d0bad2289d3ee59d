//! Greedy smallest-bucket assignment.
//!
//! Groups arrive sorted by descending result count. Each goes to the
//! partition with the smallest running result total among partitions that
//! still have room for another site; ties go to the lowest partition index.
//! This balances totals approximately; it is not an exact bin packing.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::{AtomicGroup, PlanError};

/// Assign each group to a 1-based partition index. `groups` must already be
/// in the order they should be placed.
///
/// Fails with [`PlanError::PartitionUnderProvisioned`] if every partition is
/// full before all groups are placed, and with
/// [`PlanError::ResultCountOverflow`] if a partition total exceeds `u64`.
pub fn assign_greedy(
    groups: &[AtomicGroup],
    num_partitions: usize,
    max_sites: usize,
) -> Result<Vec<usize>, PlanError> {
    let mut totals = vec![0u64; num_partitions];
    let mut sites = vec![0usize; num_partitions];

    // Each eligible partition has exactly one entry, keyed (total, index).
    let mut eligible: BinaryHeap<Reverse<(u64, usize)>> = if max_sites > 0 {
        (0..num_partitions).map(|i| Reverse((0, i))).collect()
    } else {
        BinaryHeap::new()
    };

    let mut out = Vec::with_capacity(groups.len());
    for (placed, g) in groups.iter().enumerate() {
        let Some(Reverse((_, idx))) = eligible.pop() else {
            return Err(PlanError::PartitionUnderProvisioned {
                site_id: g.site_id.clone(),
                placed,
                remaining: groups.len() - placed,
                partitions: num_partitions,
                max_sites,
            });
        };
        totals[idx] = totals[idx].checked_add(g.result_count).ok_or_else(|| {
            PlanError::ResultCountOverflow {
                site_id: g.site_id.clone(),
            }
        })?;
        sites[idx] += 1;
        if sites[idx] < max_sites {
            eligible.push(Reverse((totals[idx], idx)));
        }
        out.push(idx + 1);
    }

    Ok(out)
}
