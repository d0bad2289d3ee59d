//! `wqp inventory` – collect region inventories and replace the stored artifact.

use anyhow::{Context, Result};
use wqp_core::artifact_db::ArtifactDb;
use wqp_core::collector;
use wqp_core::config::WqpConfig;
use wqp_core::region::RegionTable;
use wqp_core::source::WqpClient;

pub async fn run_inventory(db: &ArtifactDb, cfg: &WqpConfig, regions: Vec<String>) -> Result<()> {
    let regions_path = cfg.resolve_regions_path()?;
    let table = RegionTable::load_from_path(&regions_path)?;
    let regions = if regions.is_empty() {
        table.codes()
    } else {
        regions
    };
    if regions.is_empty() {
        anyhow::bail!("no regions to collect (reference table {} is empty)", regions_path.display());
    }

    let client = WqpClient::from_config(&cfg.source);
    let pull = cfg.pull.clone();
    let outcomes = tokio::task::spawn_blocking(move || {
        collector::collect_regions(&client, &table, &regions, &pull)
    })
    .await
    .context("inventory worker panicked")?;

    println!("{:<10} {:<8} {:<10} {}", "REGION", "ROWS", "ELAPSED", "SPLIT");
    let mut records = Vec::new();
    let mut failed = Vec::new();
    for (region, outcome) in outcomes {
        match outcome {
            Ok(inv) => {
                println!(
                    "{:<10} {:<8} {:<10} {}",
                    region,
                    inv.rows,
                    format!("{:.1}s", inv.elapsed.as_secs_f64()),
                    if inv.split { "yes" } else { "no" }
                );
                records.extend(inv.records);
            }
            Err(e) => {
                println!("{:<10} {:<8} {:<10} -", region, "failed", "-");
                eprintln!("  {:#}", anyhow::Error::new(e));
                failed.push(region);
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!(
            "{} region(s) failed ({}); stored inventory left unchanged",
            failed.len(),
            failed.join(", ")
        );
    }

    let ind = db.replace_inventory(&records).await?;
    println!("Stored inventory: {} rows, sha256 {}", ind.row_count, ind.sha256);
    Ok(())
}
