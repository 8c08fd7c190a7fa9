// src/errors.rs

//! Crate-wide error type and helpers.
//!
//! Structural problems (cycles, dangling references, duplicate ids) abort a
//! recompute before anything is published. Field-level problems are collected
//! into a single [`ValidationErrors`] so they can all be fixed in one pass.

use std::fmt;

use thiserror::Error;

use crate::network::NodeId;

/// A single problem found while validating a network.
#[derive(Debug, Clone, PartialEq)]
pub enum Defect {
    /// A child list references an id that is not in the network.
    OrphanChild { parent: NodeId, child: NodeId },
    /// The same child id appears twice in one child list.
    DuplicateChild { parent: NodeId, child: NodeId },
    /// Edge quantity must be strictly positive.
    NonPositiveQuantity {
        parent: NodeId,
        child: NodeId,
        quantity: f64,
    },
    NonPositiveLeadTime { node: NodeId, lead_time: f64 },
    NegativeTolerance { node: NodeId, tolerance: f64 },
    /// `independentADU`, `moq`, `orderCycle` or `unitCost` below zero.
    NegativeField {
        node: NodeId,
        field: &'static str,
        value: f64,
    },
    UnknownProfile { node: NodeId, profile: String },
    /// Allocation needs at least one node with independent demand.
    NoCustomerFacingNodes,
}

impl Defect {
    /// Structural defects make the graph itself unusable.
    pub fn is_structural(&self) -> bool {
        matches!(self, Defect::OrphanChild { .. })
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Defect::OrphanChild { parent, child } => {
                write!(f, "node '{parent}' references unknown child '{child}'")
            }
            Defect::DuplicateChild { parent, child } => {
                write!(f, "node '{parent}' lists child '{child}' more than once")
            }
            Defect::NonPositiveQuantity {
                parent,
                child,
                quantity,
            } => write!(
                f,
                "edge '{parent}' -> '{child}' has non-positive quantity {quantity}"
            ),
            Defect::NonPositiveLeadTime { node, lead_time } => {
                write!(f, "node '{node}' has invalid leadTime: {lead_time}")
            }
            Defect::NegativeTolerance { node, tolerance } => {
                write!(f, "node '{node}' has negative customerTolerance ({tolerance})")
            }
            Defect::NegativeField { node, field, value } => {
                write!(f, "node '{node}' has negative {field} ({value})")
            }
            Defect::UnknownProfile { node, profile } => {
                write!(f, "node '{node}' references undefined profile '{profile}'")
            }
            Defect::NoCustomerFacingNodes => write!(
                f,
                "no customer-facing nodes found (independentADU > 0); nothing to allocate against"
            ),
        }
    }
}

/// Every defect found by one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<Defect>);

impl ValidationErrors {
    pub fn defects(&self) -> &[Defect] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} defect(s)", self.0.len())?;
        for defect in &self.0 {
            write!(f, "; {defect}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum DdoptimError {
    #[error("Cycle detected in network involving: {}", .0.join(", "))]
    Cycle(Vec<NodeId>),

    #[error("Node '{parent}' references unknown child '{child}'")]
    OrphanChild { parent: NodeId, child: NodeId },

    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Node '{node}' references unknown buffer profile '{profile}'")]
    UnknownProfile { node: NodeId, profile: String },

    #[error("Invalid buffer profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Load error: {0}")]
    LoadError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DdoptimError {
    /// Cycle and dangling-reference failures; nothing downstream can run.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DdoptimError::Cycle(_)
                | DdoptimError::OrphanChild { .. }
                | DdoptimError::DuplicateNode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DdoptimError>;
