// src/network/node.rs

use crate::engine::sizing::BufferSizing;
use crate::profiles::ProfileKey;
use crate::types::NodeCategory;

/// Node identifiers are the string ids used in network files.
pub type NodeId = String;

/// One BOM edge as seen from the parent: "one unit of me needs `quantity`
/// units of `id`".
#[derive(Debug, Clone, PartialEq)]
pub struct ChildLink {
    pub id: NodeId,
    pub quantity: f64,
}

impl ChildLink {
    pub fn new(id: impl Into<NodeId>, quantity: f64) -> Self {
        Self {
            id: id.into(),
            quantity,
        }
    }
}

/// Back-reference from a child to one of its parents.
///
/// Never edited directly; see [`crate::network::Network::rebuild_parents`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParentLink {
    pub id: NodeId,
    pub quantity: f64,
}

/// Fields computed by the pipeline. Never serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    /// `independent_adu × seasonal multiplier` (0 for nodes without own demand).
    pub adjusted_independent_adu: f64,
    pub calculated_adu: Option<f64>,
    pub clt: Option<f64>,
    pub dlt: Option<f64>,
    /// Allocation-only time budget; `f64::INFINITY` means unconstrained.
    pub required_lead_time: Option<f64>,
    pub delivery_lead_time: Option<f64>,
    pub missing_customer_lead_time: Option<f64>,
    pub lt_exceeding: Option<f64>,
    pub buffer_sizing: Option<BufferSizing>,
}

/// A single item of the BOM network.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub category: NodeCategory,

    /// Ordered child list (the BOM of this item).
    pub children: Vec<ChildLink>,
    pub(crate) parents: Vec<ParentLink>,

    /// Own processing / procurement time in days. Must be > 0.
    pub lead_time: f64,

    /// Externally sourced average daily usage.
    pub independent_adu: f64,
    /// Delivery time the customer accepts. `None` and `Some(0.0)` both mean
    /// "immediate delivery".
    pub customer_tolerance: Option<f64>,

    pub has_buffer: bool,
    pub buffer_locked: bool,
    pub buffer_rationale: String,
    pub buffer_profile: Option<ProfileKey>,
    pub moq: f64,
    /// Ordering frequency in days.
    pub order_cycle: f64,
    pub unit_cost: f64,

    pub derived: Derived,
}

impl Node {
    /// New node with only identity and lead time set; every other editable
    /// field takes its load default.
    pub fn new(id: impl Into<NodeId>, lead_time: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category: NodeCategory::default(),
            children: Vec::new(),
            parents: Vec::new(),
            lead_time,
            independent_adu: 0.0,
            customer_tolerance: None,
            has_buffer: false,
            buffer_locked: false,
            buffer_rationale: String::new(),
            buffer_profile: None,
            moq: 0.0,
            order_cycle: 0.0,
            unit_cost: 0.0,
            derived: Derived::default(),
        }
    }

    /// Derived parent list; rebuilt whenever any child list changes.
    pub fn parents(&self) -> &[ParentLink] {
        &self.parents
    }

    /// Nodes with independent demand face a customer.
    pub fn is_customer_facing(&self) -> bool {
        self.independent_adu > 0.0
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Tolerance as used by the algorithms: absent means zero days.
    pub fn effective_tolerance(&self) -> f64 {
        self.customer_tolerance.unwrap_or(0.0)
    }
}
