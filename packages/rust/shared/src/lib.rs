//! Shared types, error model, and configuration for QaStruct.
//!
//! This crate is the foundation depended on by all other QaStruct crates.
//! It provides:
//! - [`QaStructError`]: the unified error type
//! - Domain types ([`Marker`], [`Violation`], [`FileDate`], [`RecordId`])
//! - Configuration ([`AppConfig`], [`BatchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BatchConfig, PathsConfig, RunConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{QaStructError, Result};
pub use types::{FileDate, Marker, RecordId, StructureStats, Violation};
