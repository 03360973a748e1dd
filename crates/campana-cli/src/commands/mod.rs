//! CLI subcommand implementations.

pub mod common;
pub mod devices;
pub mod monitor;
pub mod record;
pub mod show;
