//! CLI subcommands.

pub mod cache;
pub mod common;
pub mod fly;
pub mod render;
