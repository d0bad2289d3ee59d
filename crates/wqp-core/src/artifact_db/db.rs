//! SQLite-backed artifact database implementation.
//!
//! Handles connection, migrations, and indicator bookkeeping. Table
//! replacement lives in `inventory` and `partitions`.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite, SqliteConnection};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::types::Indicator;

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the SQLite-backed artifact database.
///
/// The database file is stored under the XDG state directory:
/// `~/.local/state/wqp/artifacts.db` on Debian.
#[derive(Clone)]
pub struct ArtifactDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl ArtifactDb {
    /// Open (or create) the default artifact database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("wqp")?;
        let state_dir = xdg_dirs.get_state_home();
        Self::open_at(state_dir.join("artifacts.db")).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&uri)
            .await?;
        let db = ArtifactDb { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inventory (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                org_id TEXT NOT NULL,
                site_id TEXT NOT NULL,
                site_type TEXT NOT NULL,
                region_name TEXT NOT NULL,
                sub_region_name TEXT NOT NULL,
                huc TEXT NOT NULL,
                latitude REAL,
                longitude REAL,
                result_count INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        // One row per site; `site_id` uniqueness backs the exactly-once invariant.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS partitions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                site_id TEXT NOT NULL UNIQUE,
                result_count INTEGER NOT NULL,
                partition_index INTEGER NOT NULL,
                task_id TEXT NOT NULL,
                pull_date TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS indicators (
                artifact TEXT PRIMARY KEY,
                sha256 TEXT NOT NULL,
                row_count INTEGER NOT NULL,
                written_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Latest indicator for `artifact`, if it has ever been written.
    pub async fn indicator(&self, artifact: &str) -> Result<Option<Indicator>> {
        let row = sqlx::query(
            r#"
            SELECT artifact, sha256, row_count, written_at
            FROM indicators
            WHERE artifact = ?1
            "#,
        )
        .bind(artifact)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| indicator_from_row(&r)))
    }

    /// All recorded indicators, by artifact name.
    pub async fn list_indicators(&self) -> Result<Vec<Indicator>> {
        let rows = sqlx::query(
            r#"
            SELECT artifact, sha256, row_count, written_at
            FROM indicators
            ORDER BY artifact ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(indicator_from_row).collect())
    }
}

fn indicator_from_row(row: &sqlx::sqlite::SqliteRow) -> Indicator {
    Indicator {
        artifact: row.get("artifact"),
        sha256: row.get("sha256"),
        row_count: row.get("row_count"),
        written_at: row.get("written_at"),
    }
}

/// Insert or replace the indicator for `artifact` inside an open transaction.
pub(crate) async fn write_indicator(
    conn: &mut SqliteConnection,
    artifact: &str,
    sha256: &str,
    row_count: i64,
) -> Result<Indicator> {
    let now = unix_timestamp();
    sqlx::query(
        r#"
        INSERT INTO indicators (artifact, sha256, row_count, written_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(artifact) DO UPDATE SET
            sha256 = excluded.sha256,
            row_count = excluded.row_count,
            written_at = excluded.written_at
        "#,
    )
    .bind(artifact)
    .bind(sha256)
    .bind(row_count)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(Indicator {
        artifact: artifact.to_string(),
        sha256: sha256.to_string(),
        row_count,
        written_at: now,
    })
}

/// Current time as Unix seconds (for DB timestamps).
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<ArtifactDb> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = ArtifactDb { pool };
    db.migrate().await?;
    Ok(db)
}
