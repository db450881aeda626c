//! Shared types, error model, and configuration for docconf.
//!
//! This crate is the foundation depended on by the other docconf crates.
//! It provides:
//! - [`DocConfError`], the unified error type
//! - Domain types ([`LinkTemplate`], [`VersionValue`], [`ToolVersionRange`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, config_dir, config_file_path, init_config, init_config_in,
    load_config, load_config_from,
};
pub use error::{DocConfError, Result};
pub use types::{
    LINK_PLACEHOLDER, LinkTemplate, PLACEHOLDER_DELIMITER, PlaceholderToken, ToolVersion,
    ToolVersionRange, VersionValue,
};
