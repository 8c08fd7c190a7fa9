// src/engine/edit.rs

//! User edits and the computation stages they invalidate.

use std::collections::HashSet;
use std::fmt;

use crate::errors::{DdoptimError, Result};
use crate::network::{ChildLink, Network, Node, NodeId};
use crate::profiles::{ProfileKey, ProfileRegistry};
use crate::types::NodeCategory;

/// One step of the recompute pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Adu,
    Clt,
    Dlt,
    Delivery,
    Sizing,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Adu,
        Stage::Clt,
        Stage::Dlt,
        Stage::Delivery,
        Stage::Sizing,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Adu => "adu",
            Stage::Clt => "clt",
            Stage::Dlt => "dlt",
            Stage::Delivery => "delivery",
            Stage::Sizing => "sizing",
        };
        f.write_str(name)
    }
}

/// Small set of [`Stage`]s. Iterates in execution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSet(u8);

impl StageSet {
    pub const EMPTY: StageSet = StageSet(0);
    pub const ALL: StageSet = StageSet(0b1_1111);

    /// Everything downstream of a demand change.
    pub const DEMAND: StageSet = StageSet(0b1_1001);

    pub fn of(stages: &[Stage]) -> Self {
        let mut set = StageSet::EMPTY;
        for stage in stages {
            set.insert(*stage);
        }
        set
    }

    pub fn insert(&mut self, stage: Stage) {
        self.0 |= stage.bit();
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.0 & stage.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: StageSet) -> StageSet {
        StageSet(self.0 | other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

impl fmt::Display for StageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|s| s.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// A change to one user-editable field of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEdit {
    Name(String),
    Category(NodeCategory),
    /// Replace the whole child list. Parent links are rebuilt.
    Children(Vec<ChildLink>),
    LeadTime(f64),
    IndependentAdu(f64),
    CustomerTolerance(Option<f64>),
    HasBuffer(bool),
    BufferLocked(bool),
    BufferRationale(String),
    BufferProfile(Option<ProfileKey>),
    Moq(f64),
    OrderCycle(f64),
    UnitCost(f64),
}

impl NodeEdit {
    /// Stages whose output depends on the edited field.
    pub fn affected_stages(&self) -> StageSet {
        use Stage::*;
        match self {
            NodeEdit::Name(_)
            | NodeEdit::Category(_)
            | NodeEdit::BufferLocked(_)
            | NodeEdit::BufferRationale(_) => StageSet::EMPTY,
            NodeEdit::Children(_) => StageSet::ALL,
            NodeEdit::LeadTime(_) => StageSet::of(&[Clt, Dlt, Delivery, Sizing]),
            NodeEdit::IndependentAdu(_) => StageSet::DEMAND,
            NodeEdit::CustomerTolerance(_) => StageSet::of(&[Delivery]),
            NodeEdit::HasBuffer(_) => StageSet::of(&[Dlt, Delivery, Sizing]),
            NodeEdit::BufferProfile(_)
            | NodeEdit::Moq(_)
            | NodeEdit::OrderCycle(_)
            | NodeEdit::UnitCost(_) => StageSet::of(&[Sizing]),
        }
    }

    /// Field-level check of the new value against the current network.
    ///
    /// Cycles introduced by a [`NodeEdit::Children`] edit are caught later by
    /// the ordering pass on the edited copy.
    pub fn validate(&self, node: &str, network: &Network, profiles: &ProfileRegistry) -> Result<()> {
        let invalid = |msg: String| Err(DdoptimError::InvalidEdit(format!("node '{node}': {msg}")));

        match self {
            NodeEdit::LeadTime(v) if !(*v > 0.0 && v.is_finite()) => {
                invalid(format!("leadTime must be > 0, got {v}"))
            }
            NodeEdit::IndependentAdu(v) if !(*v >= 0.0 && v.is_finite()) => {
                invalid(format!("independentADU must be >= 0, got {v}"))
            }
            NodeEdit::CustomerTolerance(Some(v)) if !(*v >= 0.0 && v.is_finite()) => {
                invalid(format!("customerTolerance must be >= 0, got {v}"))
            }
            NodeEdit::Moq(v) | NodeEdit::OrderCycle(v) | NodeEdit::UnitCost(v)
                if !(*v >= 0.0 && v.is_finite()) =>
            {
                invalid(format!("value must be >= 0, got {v}"))
            }
            NodeEdit::BufferProfile(Some(key)) if !profiles.contains(key) => {
                Err(DdoptimError::UnknownProfile {
                    node: node.to_string(),
                    profile: key.to_string(),
                })
            }
            NodeEdit::Children(children) => {
                let mut seen: HashSet<&str> = HashSet::new();
                for child in children {
                    if child.id == node {
                        return invalid("a node cannot be its own child".to_string());
                    }
                    if !network.contains(&child.id) {
                        return Err(DdoptimError::OrphanChild {
                            parent: node.to_string(),
                            child: child.id.clone(),
                        });
                    }
                    if !seen.insert(child.id.as_str()) {
                        return invalid(format!("child '{}' listed twice", child.id));
                    }
                    if !(child.quantity > 0.0 && child.quantity.is_finite()) {
                        return invalid(format!(
                            "quantity for child '{}' must be > 0, got {}",
                            child.id, child.quantity
                        ));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Write the new value into `node`. Child lists are set through
    /// [`Network::set_children`] instead so parent links stay consistent.
    pub(crate) fn apply_to(self, node: &mut Node) {
        match self {
            NodeEdit::Name(v) => node.name = v,
            NodeEdit::Category(v) => node.category = v,
            NodeEdit::Children(v) => node.children = v,
            NodeEdit::LeadTime(v) => node.lead_time = v,
            NodeEdit::IndependentAdu(v) => node.independent_adu = v,
            NodeEdit::CustomerTolerance(v) => node.customer_tolerance = v,
            NodeEdit::HasBuffer(v) => node.has_buffer = v,
            NodeEdit::BufferLocked(v) => node.buffer_locked = v,
            NodeEdit::BufferRationale(v) => node.buffer_rationale = v,
            NodeEdit::BufferProfile(v) => node.buffer_profile = v,
            NodeEdit::Moq(v) => node.moq = v,
            NodeEdit::OrderCycle(v) => node.order_cycle = v,
            NodeEdit::UnitCost(v) => node.unit_cost = v,
        }
    }
}

/// `node.field` label for log lines.
pub(crate) fn describe(node: &NodeId, edit: &NodeEdit) -> String {
    let field = match edit {
        NodeEdit::Name(_) => "name",
        NodeEdit::Category(_) => "type",
        NodeEdit::Children(_) => "children",
        NodeEdit::LeadTime(_) => "leadTime",
        NodeEdit::IndependentAdu(_) => "independentADU",
        NodeEdit::CustomerTolerance(_) => "customerTolerance",
        NodeEdit::HasBuffer(_) => "hasBuffer",
        NodeEdit::BufferLocked(_) => "bufferLocked",
        NodeEdit::BufferRationale(_) => "bufferRationale",
        NodeEdit::BufferProfile(_) => "bufferProfile",
        NodeEdit::Moq(_) => "moq",
        NodeEdit::OrderCycle(_) => "orderCycle",
        NodeEdit::UnitCost(_) => "unitCost",
    };
    format!("{node}.{field}")
}
