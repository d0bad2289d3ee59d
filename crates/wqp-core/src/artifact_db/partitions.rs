//! Partition assignment table: full replace and load.

use anyhow::{Context, Result};
use sqlx::Row;

use super::db::{write_indicator, ArtifactDb};
use super::types::{Indicator, PARTITIONS_ARTIFACT};
use crate::indicator::sha256_rows;
use crate::planner::PartitionAssignment;

impl ArtifactDb {
    /// Replace the whole partition table with `assignments` and record its
    /// indicator. A duplicate site aborts the write and leaves the previous
    /// table in place.
    pub async fn replace_partitions(
        &self,
        assignments: &[PartitionAssignment],
    ) -> Result<Indicator> {
        let digest = sha256_rows(assignments)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM partitions")
            .execute(&mut *tx)
            .await?;

        for a in assignments {
            let count = i64::try_from(a.result_count)
                .with_context(|| format!("result count too large for site {}", a.site_id))?;
            sqlx::query(
                r#"
                INSERT INTO partitions (
                    site_id, result_count, partition_index, task_id, pull_date
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&a.site_id)
            .bind(count)
            .bind(a.partition as i64)
            .bind(&a.task_id)
            .bind(&a.pull_date)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to store assignment for site {}", a.site_id))?;
        }

        let indicator = write_indicator(
            &mut tx,
            PARTITIONS_ARTIFACT,
            &digest,
            assignments.len() as i64,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            rows = assignments.len(),
            sha256 = %indicator.sha256,
            "replaced partitions artifact"
        );
        Ok(indicator)
    }

    /// Load the partition table in the order it was written.
    pub async fn load_partitions(&self) -> Result<Vec<PartitionAssignment>> {
        let rows = sqlx::query(
            r#"
            SELECT site_id, result_count, partition_index, task_id, pull_date
            FROM partitions
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let count: i64 = row.get("result_count");
            let partition: i64 = row.get("partition_index");
            out.push(PartitionAssignment {
                site_id: row.get("site_id"),
                result_count: u64::try_from(count).context("negative result count stored")?,
                partition: usize::try_from(partition).context("negative partition index stored")?,
                task_id: row.get("task_id"),
                pull_date: row.get("pull_date"),
            });
        }
        Ok(out)
    }
}
