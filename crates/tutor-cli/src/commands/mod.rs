//! CLI subcommand implementations.

pub mod chat;
pub mod estimate;
pub mod practice;
pub mod recommend;
pub mod show_config;
pub mod skills;
