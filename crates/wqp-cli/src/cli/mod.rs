//! CLI for wqp inventory collection and partition planning.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wqp_core::artifact_db::ArtifactDb;
use wqp_core::config::{self, WqpConfig};

use commands::{run_inventory, run_partition, run_regions, run_status};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wqp")]
#[command(about = "wqp: inventory and partition planning for bounded water-quality pulls", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/wqp/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Collect per-site result counts for regions and replace the inventory.
    Inventory {
        /// Region code to collect (repeatable). Defaults to every region in the reference table.
        #[arg(long = "region", value_name = "CODE")]
        regions: Vec<String>,
    },

    /// Plan partitions from the stored inventory and replace the assignment table.
    Partition {
        /// Stamp combined with the partition index into task ids (e.g. 20240115).
        #[arg(long, value_name = "STAMP")]
        pull_date: String,
    },

    /// Show recorded artifact indicators.
    Status,

    /// List reference regions and their sub-region counts.
    Regions,
}

fn load_config(path: Option<&PathBuf>) -> Result<WqpConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_ref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Inventory { regions } => {
                let db = ArtifactDb::open_default().await?;
                run_inventory(&db, &cfg, regions).await?;
            }
            CliCommand::Partition { pull_date } => {
                let db = ArtifactDb::open_default().await?;
                run_partition(&db, &cfg, &pull_date).await?;
            }
            CliCommand::Status => {
                let db = ArtifactDb::open_default().await?;
                run_status(&db).await?;
            }
            CliCommand::Regions => run_regions(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
