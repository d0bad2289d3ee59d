//! CLI command handlers, one file per command.

mod inventory;
mod partition;
mod regions;
mod status;

pub use inventory::run_inventory;
pub use partition::run_partition;
pub use regions::run_regions;
pub use status::run_status;
