//! Pre-partition filtering: excluded site types and malformed organizations.
//!
//! Malformed organization identifiers (whitespace, `.` or `/`) are known to
//! break downstream retrieval requests, so those rows are dropped and counted
//! rather than treated as errors.
//!
//! Rules apply per inventory row, before rows are merged into sites. A site
//! whose rows fall on both sides of a rule keeps only its surviving rows.

use std::collections::HashSet;

use crate::config::PullConfig;
use crate::inventory::InventoryRecord;

/// Rules applied to every inventory row before planning.
#[derive(Debug, Clone, Default)]
pub struct FilterRules {
    pub excluded_site_types: HashSet<String>,
}

impl FilterRules {
    pub fn new<I, S>(excluded_site_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_site_types: excluded_site_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_pull(pull: &PullConfig) -> Self {
        Self::new(pull.excluded_site_types.iter().cloned())
    }
}

/// True if the organization identifier contains whitespace, a period, or a slash.
pub fn is_malformed_org(org_id: &str) -> bool {
    org_id
        .chars()
        .any(|c| c.is_whitespace() || c == '.' || c == '/')
}

/// Inventory rows and results dropped for one reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropStats {
    pub rows: usize,
    pub results: u64,
}

impl DropStats {
    fn add(&mut self, record: &InventoryRecord) {
        self.rows += 1;
        self.results = self.results.saturating_add(record.result_count);
    }
}

/// What filtering removed and kept, in rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub kept: usize,
    pub excluded_site_type: DropStats,
    pub malformed_org: DropStats,
}

/// Apply `rules` to `records`, keeping input order. A row dropped for its
/// site type is not counted again as malformed.
pub fn apply<'a>(
    records: &'a [InventoryRecord],
    rules: &FilterRules,
) -> (Vec<&'a InventoryRecord>, FilterReport) {
    let mut report = FilterReport::default();
    let mut kept = Vec::with_capacity(records.len());

    for r in records {
        if rules.excluded_site_types.contains(&r.site_type) {
            report.excluded_site_type.add(r);
        } else if is_malformed_org(&r.org_id) {
            report.malformed_org.add(r);
        } else {
            kept.push(r);
        }
    }
    report.kept = kept.len();

    if report.excluded_site_type.rows > 0 {
        tracing::info!(
            rows = report.excluded_site_type.rows,
            results = report.excluded_site_type.results,
            "dropped rows with excluded site types"
        );
    }
    if report.malformed_org.rows > 0 {
        tracing::warn!(
            rows = report.malformed_org.rows,
            results = report.malformed_org.results,
            "dropped {} rows ({} results) with malformed organization identifiers",
            report.malformed_org.rows,
            report.malformed_org.results
        );
    }

    (kept, report)
}
