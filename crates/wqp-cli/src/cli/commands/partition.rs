//! `wqp partition` – plan partitions from the stored inventory.

use anyhow::Result;
use wqp_core::artifact_db::ArtifactDb;
use wqp_core::config::WqpConfig;
use wqp_core::planner::{self, FilterRules};

pub async fn run_partition(db: &ArtifactDb, cfg: &WqpConfig, pull_date: &str) -> Result<()> {
    let records = db.load_inventory().await?;
    if records.is_empty() {
        tracing::warn!("stored inventory is empty; planning a single empty partition");
    }

    let rules = FilterRules::from_pull(&cfg.pull);
    let plan = planner::plan_partitions(&records, &cfg.partition, pull_date, &rules)?;

    let f = &plan.filter;
    println!(
        "Kept {} of {} rows; dropped {} excluded site type ({} results), {} malformed org ({} results)",
        f.kept,
        records.len(),
        f.excluded_site_type.rows,
        f.excluded_site_type.results,
        f.malformed_org.rows,
        f.malformed_org.results
    );

    println!("{:<16} {:<8} {}", "TASK", "SITES", "RESULTS");
    for p in &plan.partitions {
        println!("{:<16} {:<8} {}", p.task_id, p.sites, p.results);
    }

    let ind = db.replace_partitions(&plan.assignments).await?;
    println!(
        "Stored {} assignments in {} partitions, sha256 {}",
        ind.row_count,
        plan.partitions.len(),
        ind.sha256
    );
    Ok(())
}
