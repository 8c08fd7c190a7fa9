// src/config/mod.rs

//! File boundary: JSON network files and the TOML settings file.
//!
//! - `model.rs` holds the raw serde shapes.
//! - `validate.rs` turns raw shapes into checked domain types.
//! - `loader.rs` reads and writes files.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config_path, export_network, load_network_from_path, load_settings,
    network_from_json, network_to_json, resolve_settings,
};
pub use model::{ConfigSection, RawNetworkFile, RawSettingsFile, Settings};
