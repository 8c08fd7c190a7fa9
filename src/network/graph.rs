// src/network/graph.rs

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::errors::{DdoptimError, Defect, Result};
use crate::network::node::{ChildLink, Node, NodeId, ParentLink};
use crate::profiles::ProfileRegistry;

/// Descriptive header carried by network files.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
}

impl Default for NetworkMetadata {
    fn default() -> Self {
        Self {
            name: "untitled".to_string(),
            description: String::new(),
            version: "1.0".to_string(),
        }
    }
}

/// In-memory BOM network.
///
/// Nodes live in an arena in insertion order; `index` maps ids to arena slots.
/// Parent lists are a derived index rebuilt from every child list, never
/// patched incrementally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    pub metadata: NetworkMetadata,
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl Network {
    pub fn new(metadata: NetworkMetadata) -> Self {
        Self {
            metadata,
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a node and refresh parent links.
    ///
    /// Children may reference ids that are added later; [`Network::validate`]
    /// reports any that never appear.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        self.insert_node(node)?;
        self.rebuild_parents();
        Ok(())
    }

    /// Insert many nodes with a single parent rebuild at the end.
    pub fn extend_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) -> Result<()> {
        for node in nodes {
            self.insert_node(node)?;
        }
        self.rebuild_parents();
        Ok(())
    }

    fn insert_node(&mut self, node: Node) -> Result<()> {
        if self.index.contains_key(&node.id) {
            return Err(DdoptimError::DuplicateNode(node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => None,
        }
    }

    /// Like [`Network::get_node`] but with a typed error.
    pub fn node(&self, id: &str) -> Result<&Node> {
        self.get_node(id)
            .ok_or_else(|| DdoptimError::NodeNotFound(id.to_string()))
    }

    pub fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.get_node_mut(id)
            .ok_or_else(|| DdoptimError::NodeNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Callers must not change `id` or `children` through this iterator.
    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    /// Immediate children of a node (its BOM lines).
    pub fn children(&self, id: &str) -> &[ChildLink] {
        self.get_node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate parents of a node (items whose BOM lists it).
    pub fn parents(&self, id: &str) -> &[ParentLink] {
        self.get_node(id).map(|n| n.parents()).unwrap_or(&[])
    }

    /// Nodes nothing consumes; normally the finished products.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.parents.is_empty())
    }

    /// Nodes with an empty BOM; purchased parts and raw material.
    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// Replace a node's child list and refresh parent links.
    pub fn set_children(&mut self, id: &str, children: Vec<ChildLink>) -> Result<()> {
        self.node_mut(id)?.children = children;
        self.rebuild_parents();
        Ok(())
    }

    /// Clear every parent list and recompute it from every child list.
    ///
    /// Links to ids not present in the network are skipped here and reported
    /// by [`Network::validate`].
    pub fn rebuild_parents(&mut self) {
        for node in self.nodes.iter_mut() {
            node.parents.clear();
        }

        let mut links: Vec<(usize, ParentLink)> = Vec::new();
        for node in self.nodes.iter() {
            for child in node.children.iter() {
                if let Some(&child_idx) = self.index.get(&child.id) {
                    links.push((
                        child_idx,
                        ParentLink {
                            id: node.id.clone(),
                            quantity: child.quantity,
                        },
                    ));
                }
            }
        }

        let edge_count = links.len();
        for (child_idx, link) in links {
            self.nodes[child_idx].parents.push(link);
        }

        debug!(nodes = self.nodes.len(), edges = edge_count, "rebuilt parent links");
    }

    /// Collect every defect in node fields and edges.
    ///
    /// Cycles are not checked here; they surface from the ordering service.
    pub fn validate(&self) -> Vec<Defect> {
        let mut defects = Vec::new();

        for node in self.nodes.iter() {
            let mut seen: HashSet<&str> = HashSet::new();
            for child in node.children.iter() {
                if !self.index.contains_key(&child.id) {
                    defects.push(Defect::OrphanChild {
                        parent: node.id.clone(),
                        child: child.id.clone(),
                    });
                }
                if !seen.insert(child.id.as_str()) {
                    defects.push(Defect::DuplicateChild {
                        parent: node.id.clone(),
                        child: child.id.clone(),
                    });
                }
                if !(child.quantity > 0.0) {
                    defects.push(Defect::NonPositiveQuantity {
                        parent: node.id.clone(),
                        child: child.id.clone(),
                        quantity: child.quantity,
                    });
                }
            }

            if !(node.lead_time > 0.0) {
                defects.push(Defect::NonPositiveLeadTime {
                    node: node.id.clone(),
                    lead_time: node.lead_time,
                });
            }

            if let Some(tolerance) = node.customer_tolerance {
                if tolerance < 0.0 {
                    defects.push(Defect::NegativeTolerance {
                        node: node.id.clone(),
                        tolerance,
                    });
                }
            }

            for (field, value) in [
                ("independentADU", node.independent_adu),
                ("moq", node.moq),
                ("orderCycle", node.order_cycle),
                ("unitCost", node.unit_cost),
            ] {
                if value < 0.0 {
                    defects.push(Defect::NegativeField {
                        node: node.id.clone(),
                        field,
                        value,
                    });
                }
            }
        }

        defects
    }

    /// [`Network::validate`] plus a check that every referenced buffer
    /// profile exists in `profiles`.
    pub fn validate_with_profiles(&self, profiles: &ProfileRegistry) -> Vec<Defect> {
        let mut defects = self.validate();
        for node in self.nodes.iter() {
            if let Some(key) = &node.buffer_profile {
                if !profiles.contains(key) {
                    defects.push(Defect::UnknownProfile {
                        node: node.id.clone(),
                        profile: key.to_string(),
                    });
                }
            }
        }
        defects
    }
}
