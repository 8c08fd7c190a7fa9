// src/profiles/registry.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::{DdoptimError, Result};
use crate::profiles::profile::{BufferProfile, ProfileKey};

/// Read-only table of buffer profiles keyed by [`ProfileKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileRegistry {
    profiles: BTreeMap<ProfileKey, BufferProfile>,
}

impl ProfileRegistry {
    /// Build a registry, rejecting any inconsistent profile.
    pub fn new(profiles: BTreeMap<ProfileKey, BufferProfile>) -> Result<Self> {
        for (key, profile) in profiles.iter() {
            profile.validate(key)?;
        }
        debug!(count = profiles.len(), "buffer profile registry built");
        Ok(Self { profiles })
    }

    /// The five reference profiles: manufactured (F), intermediate (I),
    /// machined (U), purchased local (AL) and purchased international (AI).
    pub fn standard() -> Self {
        let short_band = |description: &str, variability_factor: f64| BufferProfile {
            description: description.to_string(),
            dlt_threshold_short: 1.0,
            dlt_threshold_medium: 3.0,
            dlt_threshold_long: 7.0,
            lead_time_factor_short: 0.7,
            lead_time_factor_medium: 0.5,
            lead_time_factor_long: 0.25,
            variability_factor,
        };
        let long_band = |description: &str, variability_factor: f64| BufferProfile {
            dlt_threshold_medium: 5.0,
            dlt_threshold_long: 21.0,
            ..short_band(description, variability_factor)
        };

        let profiles = BTreeMap::from([
            (
                ProfileKey::from("F"),
                short_band("Manufactured / finished, low variability", 0.25),
            ),
            (
                ProfileKey::from("I"),
                short_band("Intermediate / semi-finished, low variability", 0.25),
            ),
            (
                ProfileKey::from("U"),
                long_band("Machined, medium variability, capacity constrained", 0.5),
            ),
            (
                ProfileKey::from("AL"),
                short_band("Purchased local, medium variability", 0.5),
            ),
            (
                ProfileKey::from("AI"),
                long_band("Purchased international, high variability", 0.7),
            ),
        ]);

        Self { profiles }
    }

    pub fn get(&self, key: &ProfileKey) -> Option<&BufferProfile> {
        self.profiles.get(key)
    }

    /// Look a profile up, failing closed on unknown keys.
    pub fn require(&self, node: &str, key: &ProfileKey) -> Result<&BufferProfile> {
        self.profiles
            .get(key)
            .ok_or_else(|| DdoptimError::UnknownProfile {
                node: node.to_string(),
                profile: key.to_string(),
            })
    }

    pub fn contains(&self, key: &ProfileKey) -> bool {
        self.profiles.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ProfileKey> {
        self.profiles.keys()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
