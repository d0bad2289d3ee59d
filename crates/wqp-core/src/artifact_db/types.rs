//! Types used by the artifact database.

/// Artifact name of the inventory table.
pub const INVENTORY_ARTIFACT: &str = "inventory";
/// Artifact name of the partition assignment table.
pub const PARTITIONS_ARTIFACT: &str = "partitions";

/// Version marker recorded each time an artifact is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub artifact: String,
    /// SHA-256 (hex) of the canonical row encoding.
    pub sha256: String,
    pub row_count: i64,
    /// Unix seconds.
    pub written_at: i64,
}
