// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::network::{Network, NetworkMetadata};
use crate::profiles::{BufferProfile, ProfileKey, ProfileRegistry};
use crate::types::{LockPolicy, NodeCategory};

/// Network file as read from JSON, before any structural check.
///
/// ```json
/// {
///   "metadata": { "name": "Weber Pignons", "version": "1.0" },
///   "nodes": [
///     { "id": "velo", "leadTime": 5, "independentADU": 40,
///       "children": [{ "id": "roue", "quantity": 2 }] },
///     { "id": "roue", "leadTime": 4 }
///   ]
/// }
/// ```
///
/// Only [`crate::config::validate`] turns this into a [`Network`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawNetworkFile {
    #[serde(default)]
    pub metadata: RawMetadata,

    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// One `nodes[]` entry. Field names follow the file format (camelCase).
///
/// Missing numbers default to 0, flags to false, strings to empty. `name`
/// defaults to the id.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    /// Required; a missing or empty id is reported with the node's index.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<NodeCategory>,

    #[serde(default)]
    pub children: Vec<RawChild>,

    #[serde(default, rename = "independentADU")]
    pub independent_adu: f64,

    #[serde(default)]
    pub lead_time: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_tolerance: Option<f64>,

    #[serde(default)]
    pub has_buffer: bool,

    #[serde(default)]
    pub buffer_locked: bool,

    #[serde(default)]
    pub buffer_rationale: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_profile: Option<ProfileKey>,

    #[serde(default, rename = "moq", alias = "MOQ")]
    pub moq: f64,

    #[serde(default)]
    pub order_cycle: f64,

    #[serde(default)]
    pub unit_cost: f64,
}

/// `children[]` entry. A missing quantity means one unit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawChild {
    pub id: String,

    #[serde(default = "default_quantity")]
    pub quantity: f64,
}

fn default_quantity() -> f64 {
    1.0
}

impl From<&Network> for RawNetworkFile {
    /// Export view: identity, structure and user-editable fields only, in
    /// network order.
    fn from(network: &Network) -> Self {
        let metadata = RawMetadata {
            name: Some(network.metadata.name.clone()),
            description: Some(network.metadata.description.clone()),
            version: Some(network.metadata.version.clone()),
        };

        let nodes = network
            .nodes()
            .map(|node| RawNode {
                id: Some(node.id.clone()),
                name: Some(node.name.clone()),
                // A node loaded without a `type` exports without one.
                category: (node.category != NodeCategory::default())
                    .then(|| node.category.clone()),
                children: node
                    .children
                    .iter()
                    .map(|c| RawChild {
                        id: c.id.clone(),
                        quantity: c.quantity,
                    })
                    .collect(),
                independent_adu: node.independent_adu,
                lead_time: node.lead_time,
                customer_tolerance: node.customer_tolerance,
                has_buffer: node.has_buffer,
                buffer_locked: node.buffer_locked,
                buffer_rationale: node.buffer_rationale.clone(),
                buffer_profile: node.buffer_profile.clone(),
                moq: node.moq,
                order_cycle: node.order_cycle,
                unit_cost: node.unit_cost,
            })
            .collect();

        Self { metadata, nodes }
    }
}

impl From<RawMetadata> for NetworkMetadata {
    fn from(raw: RawMetadata) -> Self {
        let defaults = NetworkMetadata::default();
        Self {
            name: raw.name.unwrap_or(defaults.name),
            description: raw.description.unwrap_or(defaults.description),
            version: raw.version.unwrap_or(defaults.version),
        }
    }
}

/// Settings file (`Ddoptim.toml`) as read from TOML.
///
/// ```toml
/// [config]
/// seasonal_multiplier = 1.3
/// lock_policy = "respect"
/// auto_position = true
///
/// [profile.F]
/// dlt_threshold_short = 1
/// dlt_threshold_medium = 3
/// dlt_threshold_long = 7
/// lead_time_factor_short = 0.7
/// lead_time_factor_medium = 0.5
/// lead_time_factor_long = 0.25
/// variability_factor = 0.25
/// ```
///
/// All sections are optional. When any `[profile.<KEY>]` table is present,
/// the tables replace the built-in profiles instead of extending them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettingsFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub profile: BTreeMap<ProfileKey, BufferProfile>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Multiplies every positive independent ADU.
    #[serde(default = "default_seasonal_multiplier")]
    pub seasonal_multiplier: f64,

    #[serde(default)]
    pub lock_policy: LockPolicy,

    /// Run buffer auto-positioning after the initial recompute.
    #[serde(default)]
    pub auto_position: bool,
}

fn default_seasonal_multiplier() -> f64 {
    1.0
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            seasonal_multiplier: default_seasonal_multiplier(),
            lock_policy: LockPolicy::default(),
            auto_position: false,
        }
    }
}

/// Validated settings. Only built through `TryFrom<RawSettingsFile>`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: ConfigSection,
    pub profiles: ProfileRegistry,
}

impl Settings {
    pub(crate) fn new_unchecked(config: ConfigSection, profiles: ProfileRegistry) -> Self {
        Self { config, profiles }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: ConfigSection::default(),
            profiles: ProfileRegistry::standard(),
        }
    }
}
