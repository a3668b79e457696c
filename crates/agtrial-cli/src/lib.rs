//! CLI library components for the field-trial ingestion tool.

pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
