pub mod config;
pub mod logging;

pub mod artifact_db;
pub mod collector;
pub mod indicator;
pub mod inventory;
pub mod planner;
pub mod region;
pub mod source;
