// tests/adu_propagation.rs

use std::error::Error;

use ddoptim::engine::propagate_adu;
use ddoptim::errors::DdoptimError;
use ddoptim_test_utils::builders::{NetworkBuilder, NodeBuilder};
use ddoptim_test_utils::fixtures::{bike_chain, shared_component};
use ddoptim_test_utils::{approx_eq, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

fn adu(network: &ddoptim::network::Network, id: &str) -> f64 {
    network
        .get_node(id)
        .and_then(|n| n.derived.calculated_adu)
        .unwrap_or(f64::NAN)
}

#[test]
fn seasonal_multiplier_scales_demand_down_the_bom() -> TestResult {
    init_tracing();

    let mut network = bike_chain();
    propagate_adu(&mut network, 1.3)?;

    assert!(approx_eq(adu(&network, "velo"), 52.0));
    assert!(approx_eq(adu(&network, "roue"), 104.0));
    assert!(approx_eq(adu(&network, "rayons"), 7488.0));

    let rayons = network.node("rayons")?;
    assert_eq!(rayons.derived.adjusted_independent_adu, 0.0);
    Ok(())
}

#[test]
fn shared_component_sums_demand_from_every_parent() -> TestResult {
    let mut network = shared_component();
    propagate_adu(&mut network, 1.0)?;

    // 10 × 2 + 6 × 1
    assert!(approx_eq(adu(&network, "roue"), 26.0));
    assert!(approx_eq(adu(&network, "rayons"), 26.0 * 36.0));
    assert!(approx_eq(adu(&network, "jante"), 26.0));
    Ok(())
}

#[test]
fn component_with_own_demand_adds_it_to_dependent_demand() -> TestResult {
    let mut network = NetworkBuilder::new()
        .with_node(NodeBuilder::new("velo", 5.0).adu(10.0).child("roue", 2.0))
        .with_node(NodeBuilder::new("roue", 4.0).adu(3.0))
        .build();

    propagate_adu(&mut network, 2.0)?;

    let roue = network.node("roue")?;
    assert!(approx_eq(roue.derived.adjusted_independent_adu, 6.0));
    assert!(approx_eq(adu(&network, "roue"), 6.0 + 20.0 * 2.0));
    Ok(())
}

#[test]
fn demand_is_conserved_at_every_node() -> TestResult {
    let mut network = shared_component();
    propagate_adu(&mut network, 1.7)?;

    for node in network.nodes() {
        let from_parents: f64 = node
            .parents()
            .iter()
            .map(|p| adu(&network, &p.id) * p.quantity)
            .sum();
        let expected = node.derived.adjusted_independent_adu + from_parents;
        assert!(
            approx_eq(node.derived.calculated_adu.unwrap_or(f64::NAN), expected),
            "conservation broken at {}",
            node.id
        );
    }
    Ok(())
}

#[test]
fn cycle_fails_without_touching_any_field() {
    init_tracing();

    let mut network = NetworkBuilder::new()
        .with_node(NodeBuilder::new("a", 1.0).adu(5.0).child("b", 1.0))
        .with_node(NodeBuilder::new("b", 1.0).child("a", 1.0))
        .build();
    let before = network.clone();

    let result = propagate_adu(&mut network, 1.0);

    assert!(matches!(result, Err(DdoptimError::Cycle(_))));
    assert_eq!(network, before);
}
