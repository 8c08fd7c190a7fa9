#![allow(dead_code)]

use ddoptim::network::{ChildLink, Network, NetworkMetadata, Node};
use ddoptim::profiles::ProfileKey;
use ddoptim::types::NodeCategory;

/// Builder for `Network` to simplify test setup.
pub struct NetworkBuilder {
    metadata: NetworkMetadata,
    nodes: Vec<Node>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            metadata: NetworkMetadata::default(),
            nodes: Vec::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.metadata.name = name.to_string();
        self
    }

    pub fn with_node(mut self, node: NodeBuilder) -> Self {
        self.nodes.push(node.build());
        self
    }

    /// Panics on duplicate ids; dangling children are allowed so tests can
    /// build invalid networks on purpose.
    pub fn build(self) -> Network {
        let mut network = Network::new(self.metadata);
        network
            .extend_nodes(self.nodes)
            .expect("Failed to build network from builder");
        network
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Node`.
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(id: &str, lead_time: f64) -> Self {
        Self {
            node: Node::new(id, lead_time),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.node.name = name.to_string();
        self
    }

    pub fn category(mut self, category: NodeCategory) -> Self {
        self.node.category = category;
        self
    }

    pub fn child(mut self, id: &str, quantity: f64) -> Self {
        self.node.children.push(ChildLink::new(id, quantity));
        self
    }

    pub fn adu(mut self, adu: f64) -> Self {
        self.node.independent_adu = adu;
        self
    }

    pub fn tolerance(mut self, days: f64) -> Self {
        self.node.customer_tolerance = Some(days);
        self
    }

    pub fn buffered(mut self) -> Self {
        self.node.has_buffer = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.node.buffer_locked = true;
        self
    }

    pub fn rationale(mut self, text: &str) -> Self {
        self.node.buffer_rationale = text.to_string();
        self
    }

    pub fn profile(mut self, key: &str) -> Self {
        self.node.buffer_profile = Some(ProfileKey::from(key));
        self
    }

    pub fn moq(mut self, moq: f64) -> Self {
        self.node.moq = moq;
        self
    }

    pub fn order_cycle(mut self, days: f64) -> Self {
        self.node.order_cycle = days;
        self
    }

    pub fn unit_cost(mut self, cost: f64) -> Self {
        self.node.unit_cost = cost;
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}
