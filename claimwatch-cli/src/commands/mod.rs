//! CLI command implementations.

pub mod config;
pub mod link;
pub mod poll;
