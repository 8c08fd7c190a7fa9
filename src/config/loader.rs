// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{RawNetworkFile, RawSettingsFile, Settings};
use crate::errors::Result;
use crate::network::Network;

/// Read a network file without any structural check.
pub fn load_raw_network(path: impl AsRef<Path>) -> Result<RawNetworkFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawNetworkFile = serde_json::from_str(&contents)?;
    Ok(raw)
}

/// Read and structurally validate a network file.
///
/// Only user-editable fields are populated; run a
/// [`crate::engine::Pipeline`] to fill in derived values.
pub fn load_network_from_path(path: impl AsRef<Path>) -> Result<Network> {
    let path = path.as_ref();
    let raw = load_raw_network(path)?;
    let network = Network::try_from(raw)?;
    info!(path = %path.display(), nodes = network.len(), "network loaded");
    Ok(network)
}

/// Parse a network from a JSON string.
pub fn network_from_json(json: &str) -> Result<Network> {
    let raw: RawNetworkFile = serde_json::from_str(json)?;
    Network::try_from(raw)
}

/// Serialize the user-editable part of a network as pretty JSON.
pub fn network_to_json(network: &Network) -> Result<String> {
    Ok(serde_json::to_string_pretty(&RawNetworkFile::from(network))?)
}

pub fn export_network(network: &Network, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, network_to_json(network)?)?;
    info!(path = %path.display(), nodes = network.len(), "network exported");
    Ok(())
}

/// Read and validate a settings file.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawSettingsFile = toml::from_str(&contents)?;
    Settings::try_from(raw)
}

/// Use `path` when given, else `Ddoptim.toml` if it exists, else defaults.
pub fn resolve_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => load_settings(path),
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                load_settings(default_path)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("Ddoptim.toml")
}
