use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// What kind of item a node represents in the BOM.
///
/// The list is open: any unrecognised category string is kept verbatim in
/// [`NodeCategory::Other`] so that exports round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    FinishedProduct,
    Intermediate,
    Machined,
    PurchasedLocal,
    PurchasedInternational,
    Other(String),
}

impl NodeCategory {
    pub fn as_str(&self) -> &str {
        match self {
            NodeCategory::FinishedProduct => "finished_product",
            NodeCategory::Intermediate => "intermediate",
            NodeCategory::Machined => "machined",
            NodeCategory::PurchasedLocal => "purchased_local",
            NodeCategory::PurchasedInternational => "purchased_international",
            NodeCategory::Other(s) => s.as_str(),
        }
    }
}

/// Category of a node whose file entry has no `type`. Never exported.
impl Default for NodeCategory {
    fn default() -> Self {
        NodeCategory::Other("unknown".to_string())
    }
}

impl FromStr for NodeCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s.trim().to_lowercase().replace('-', "_").as_str() {
            "finished_product" | "finished" => NodeCategory::FinishedProduct,
            "intermediate" | "semi_finished" => NodeCategory::Intermediate,
            "machined" => NodeCategory::Machined,
            "purchased_local" | "purchased" => NodeCategory::PurchasedLocal,
            "purchased_international" => NodeCategory::PurchasedInternational,
            _ => NodeCategory::Other(s.trim().to_string()),
        };
        Ok(category)
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(category) = raw.parse::<NodeCategory>();
        Ok(category)
    }
}

/// How the allocation run treats `bufferLocked` nodes.
///
/// - `Respect` (default): locked nodes keep their buffer decision; a locked
///   buffer stops propagation and a locked node without a buffer that cannot
///   meet its budget is reported as unsolvable.
/// - `Ignore`: every buffer is cleared and re-decided as if nothing were locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockPolicy {
    #[default]
    Respect,
    Ignore,
}

impl FromStr for LockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "respect" => Ok(LockPolicy::Respect),
            "ignore" => Ok(LockPolicy::Ignore),
            other => Err(format!(
                "invalid lock_policy: {other} (expected \"respect\" or \"ignore\")"
            )),
        }
    }
}
