//! Collector error type.

use thiserror::Error;

use crate::source::SourceError;

/// Fatal outcome of collecting one region.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The broad query failed and the region has no sub-regions to split into.
    #[error("region {region}: query failed and cannot be split: {source}")]
    RemoteQueryFailure {
        region: String,
        #[source]
        source: SourceError,
    },
    /// A sub-region query failed after splitting; not retried further.
    #[error("region {region}: sub-region query ({scope}) failed: {source}")]
    RemoteQuerySubFailure {
        region: String,
        scope: String,
        #[source]
        source: SourceError,
    },
    /// The broad query failed and the region is missing from the reference table.
    #[error("region {region}: query failed and region is not in the reference table: {source}")]
    UnknownRegion {
        region: String,
        #[source]
        source: SourceError,
    },
}

impl CollectError {
    pub fn region(&self) -> &str {
        match self {
            CollectError::RemoteQueryFailure { region, .. }
            | CollectError::RemoteQuerySubFailure { region, .. }
            | CollectError::UnknownRegion { region, .. } => region,
        }
    }
}
