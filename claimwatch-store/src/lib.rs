// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # ClaimWatch Store
//!
//! Persistent configuration for the ClaimWatch application.
//!
//! ## Usage
//!
//! ```ignore
//! use claimwatch_store::Config;
//!
//! let config = Config::load()?;
//! let query = config.poll.query_builder(token, shop).build()?;
//! ```

pub mod config;
pub mod error;

pub use config::{Config, GeneralConfig, LinksConfig, LookupConfig, PollConfig};
pub use error::StoreError;
