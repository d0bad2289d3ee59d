//! `wqp status` – show recorded artifact indicators.

use anyhow::Result;
use wqp_core::artifact_db::ArtifactDb;

pub async fn run_status(db: &ArtifactDb) -> Result<()> {
    let indicators = db.list_indicators().await?;
    if indicators.is_empty() {
        println!("No artifacts written yet.");
    } else {
        println!("{:<12} {:<8} {:<12} {}", "ARTIFACT", "ROWS", "WRITTEN", "SHA256");
        for i in indicators {
            println!(
                "{:<12} {:<8} {:<12} {}",
                i.artifact, i.row_count, i.written_at, i.sha256
            );
        }
    }
    Ok(())
}
