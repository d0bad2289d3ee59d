//! Inventory table: full replace and load.

use anyhow::{Context, Result};
use sqlx::Row;

use super::db::{write_indicator, ArtifactDb};
use super::types::{Indicator, INVENTORY_ARTIFACT};
use crate::indicator::sha256_rows;
use crate::inventory::InventoryRecord;

impl ArtifactDb {
    /// Replace the whole inventory table with `records` (kept in order) and
    /// record its indicator. Nothing is written if any row fails to insert.
    pub async fn replace_inventory(&self, records: &[InventoryRecord]) -> Result<Indicator> {
        let digest = sha256_rows(records)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM inventory")
            .execute(&mut *tx)
            .await?;

        for r in records {
            let count = i64::try_from(r.result_count)
                .with_context(|| format!("result count too large for site {}", r.site_id))?;
            sqlx::query(
                r#"
                INSERT INTO inventory (
                    org_id, site_id, site_type, region_name, sub_region_name,
                    huc, latitude, longitude, result_count
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&r.org_id)
            .bind(&r.site_id)
            .bind(&r.site_type)
            .bind(&r.region_name)
            .bind(&r.sub_region_name)
            .bind(&r.huc)
            .bind(r.latitude)
            .bind(r.longitude)
            .bind(count)
            .execute(&mut *tx)
            .await?;
        }

        let indicator =
            write_indicator(&mut tx, INVENTORY_ARTIFACT, &digest, records.len() as i64).await?;
        tx.commit().await?;

        tracing::info!(
            rows = records.len(),
            sha256 = %indicator.sha256,
            "replaced inventory artifact"
        );
        Ok(indicator)
    }

    /// Load the inventory table in the order it was written.
    pub async fn load_inventory(&self) -> Result<Vec<InventoryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT org_id, site_id, site_type, region_name, sub_region_name,
                   huc, latitude, longitude, result_count
            FROM inventory
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let count: i64 = row.get("result_count");
            let site_id: String = row.get("site_id");
            let result_count = u64::try_from(count)
                .with_context(|| format!("negative result count stored for site {}", site_id))?;
            out.push(InventoryRecord {
                org_id: row.get("org_id"),
                site_id,
                site_type: row.get("site_type"),
                region_name: row.get("region_name"),
                sub_region_name: row.get("sub_region_name"),
                huc: row.get("huc"),
                latitude: row.get("latitude"),
                longitude: row.get("longitude"),
                result_count,
            });
        }
        Ok(out)
    }
}
