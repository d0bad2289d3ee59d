//! `wqp regions` – list the reference regions.

use anyhow::Result;
use wqp_core::config::WqpConfig;
use wqp_core::region::RegionTable;

pub fn run_regions(cfg: &WqpConfig) -> Result<()> {
    let table = RegionTable::load_from_path(&cfg.resolve_regions_path()?)?;
    if table.is_empty() {
        println!("No regions in reference table.");
        return Ok(());
    }
    println!("{:<8} {:<9} {}", "CODE", "COUNTIES", "NAME");
    for r in table.regions() {
        println!("{:<8} {:<9} {}", r.code, r.counties.len(), r.name);
    }
    Ok(())
}
