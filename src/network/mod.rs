// src/network/mod.rs

//! BOM network representation and ordering.
//!
//! - [`node`] holds the per-item record (user-editable and derived fields).
//! - [`graph`] holds the arena of nodes plus the derived parent index.
//! - [`order`] produces edge-consistent linear orders and detects cycles.

pub mod graph;
pub mod node;
pub mod order;

pub use graph::{Network, NetworkMetadata};
pub use node::{ChildLink, Derived, Node, NodeId, ParentLink};
pub use order::{parent_first_order, reverse_topological_order, topological_order};
