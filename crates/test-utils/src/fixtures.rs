//! Small reference networks shared by the integration tests.

use ddoptim::network::Network;
use ddoptim::types::NodeCategory;

use crate::builders::{NetworkBuilder, NodeBuilder};

/// `velo -> roue (x2) -> rayons (x72)`, lead times 5/4/15, velo ADU 40.
pub fn bike_chain() -> Network {
    NetworkBuilder::new()
        .named("bike chain")
        .with_node(
            NodeBuilder::new("velo", 5.0)
                .category(NodeCategory::FinishedProduct)
                .adu(40.0)
                .child("roue", 2.0)
                .profile("F")
                .unit_cost(500.0),
        )
        .with_node(
            NodeBuilder::new("roue", 4.0)
                .category(NodeCategory::Intermediate)
                .child("rayons", 72.0)
                .profile("I")
                .unit_cost(40.0),
        )
        .with_node(
            NodeBuilder::new("rayons", 15.0)
                .category(NodeCategory::PurchasedInternational)
                .profile("AI")
                .unit_cost(0.1),
        )
        .build()
}

/// Two finished products sharing one component, plus a second level.
///
/// ```text
/// velo (5, ADU 10, tol 20) ──x2──┐
///                                ├─> roue (4) ──x36──> rayons (15)
/// trottinette (3, ADU 6) ───x1───┘        └──x1──> jante (8)
/// ```
pub fn shared_component() -> Network {
    NetworkBuilder::new()
        .named("shared component")
        .with_node(
            NodeBuilder::new("velo", 5.0)
                .adu(10.0)
                .tolerance(20.0)
                .child("roue", 2.0)
                .profile("F"),
        )
        .with_node(
            NodeBuilder::new("trottinette", 3.0)
                .adu(6.0)
                .child("roue", 1.0)
                .profile("F"),
        )
        .with_node(
            NodeBuilder::new("roue", 4.0)
                .child("rayons", 36.0)
                .child("jante", 1.0)
                .profile("I"),
        )
        .with_node(NodeBuilder::new("rayons", 15.0).profile("AI"))
        .with_node(NodeBuilder::new("jante", 8.0).profile("AL"))
        .build()
}
