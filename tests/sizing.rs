// tests/sizing.rs

use std::collections::BTreeMap;
use std::error::Error;

use ddoptim::engine::{BufferSizing, Pipeline, size_all, size_buffer};
use ddoptim::errors::DdoptimError;
use ddoptim::network::Network;
use ddoptim::profiles::{BufferProfile, ProfileKey, ProfileRegistry};
use ddoptim_test_utils::builders::NodeBuilder;
use ddoptim_test_utils::fixtures::bike_chain;
use ddoptim_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

/// bike chain with roue buffered: ADU 80, DLT 19, profile I.
fn sized_roue(configure: impl FnOnce(&mut ddoptim::network::Node)) -> Result<BufferSizing, Box<dyn Error>> {
    let mut network = bike_chain();
    {
        let roue = network.node_mut("roue")?;
        roue.has_buffer = true;
        configure(roue);
    }
    Pipeline::default().recompute(&mut network)?;
    Ok(network
        .node("roue")?
        .derived
        .buffer_sizing
        .clone()
        .ok_or("roue was not sized")?)
}

#[test]
fn zones_follow_the_worked_example() -> TestResult {
    init_tracing();

    let sizing = sized_roue(|_| {})?;

    assert_eq!(sizing.yellow, 1520.0); // round(80 × 19)
    assert_eq!(sizing.lead_time_factor, 0.25); // 19 > medium threshold 3
    assert_eq!(sizing.green_delay, 380.0);
    assert_eq!(sizing.green, 380.0);
    assert_eq!(sizing.variability_factor, 0.25);
    assert_eq!(sizing.red_base, 380.0);
    assert_eq!(sizing.red_security, 95.0);
    assert_eq!(sizing.red, 475.0);
    assert_eq!(sizing.top_of_red, 475.0);
    assert_eq!(sizing.top_of_yellow, 1995.0);
    assert_eq!(sizing.top_of_green, 2375.0);
    assert_eq!(sizing.average_stock, 665.0);
    assert_eq!(sizing.inventory_value, 26600.0);
    Ok(())
}

#[test]
fn red_security_stays_on_delay_component_when_moq_dominates_green() -> TestResult {
    let sizing = sized_roue(|roue| roue.moq = 1000.0)?;

    assert_eq!(sizing.green_moq, 1000.0);
    assert_eq!(sizing.green, 1000.0);
    // Still derived from green_delay (380), not from the final green.
    assert_eq!(sizing.red_security, 95.0);
    assert_eq!(sizing.red, 475.0);
    assert_eq!(sizing.average_stock, 975.0);
    Ok(())
}

#[test]
fn order_cycle_can_dominate_green() -> TestResult {
    let sizing = sized_roue(|roue| roue.order_cycle = 10.0)?;

    assert_eq!(sizing.green_cycle, 800.0);
    assert_eq!(sizing.green, 800.0);
    assert_eq!(sizing.red, 475.0);
    Ok(())
}

#[test]
fn inventory_value_is_rounded_to_cents() -> TestResult {
    let sizing = sized_roue(|roue| roue.unit_cost = 0.1234)?;
    // 665 × 0.1234 = 82.061
    assert!((sizing.inventory_value - 82.06).abs() < 1e-9);
    Ok(())
}

#[test]
fn lead_time_factor_bands() {
    let registry = ProfileRegistry::standard();
    let profile = registry.get(&ProfileKey::from("AI")).expect("standard profile");

    assert_eq!(profile.lead_time_factor(1.0), 0.7);
    assert_eq!(profile.lead_time_factor(5.0), 0.5);
    assert_eq!(profile.lead_time_factor(5.5), 0.25);
    assert_eq!(profile.lead_time_factor(40.0), 0.25);
}

#[test]
fn unbuffered_node_has_sizing_cleared() -> TestResult {
    let registry = ProfileRegistry::standard();
    let mut node = NodeBuilder::new("x", 3.0).profile("F").build();
    node.derived.calculated_adu = Some(10.0);
    node.derived.dlt = Some(3.0);
    node.has_buffer = true;
    size_buffer(&mut node, &registry)?;
    assert!(node.derived.buffer_sizing.is_some());

    node.has_buffer = false;
    size_buffer(&mut node, &registry)?;
    assert!(node.derived.buffer_sizing.is_none());
    Ok(())
}

#[test]
fn missing_inputs_skip_sizing_without_error() -> TestResult {
    let registry = ProfileRegistry::standard();

    let mut no_profile = NodeBuilder::new("x", 3.0).buffered().build();
    no_profile.derived.calculated_adu = Some(10.0);
    no_profile.derived.dlt = Some(3.0);
    size_buffer(&mut no_profile, &registry)?;
    assert!(no_profile.derived.buffer_sizing.is_none());

    let mut no_demand = NodeBuilder::new("y", 3.0).buffered().profile("F").build();
    no_demand.derived.calculated_adu = Some(0.0);
    no_demand.derived.dlt = Some(3.0);
    size_buffer(&mut no_demand, &registry)?;
    assert!(no_demand.derived.buffer_sizing.is_none());
    Ok(())
}

#[test]
fn unknown_profile_fails_closed() -> TestResult {
    init_tracing();

    let mut network = bike_chain();
    Pipeline::default().recompute(&mut network)?;
    {
        let roue = network.node_mut("roue")?;
        roue.has_buffer = true;
        roue.buffer_profile = Some(ProfileKey::from("ZZ"));
    }
    let before = network.clone();

    match size_all(&mut network, &ProfileRegistry::standard()) {
        Err(DdoptimError::UnknownProfile { node, profile }) => {
            assert_eq!(node, "roue");
            assert_eq!(profile, "ZZ");
        }
        other => panic!("Expected UnknownProfile, got: {:?}", other),
    }
    assert_eq!(network, before);

    let result = Pipeline::default().recompute(&mut network);
    assert!(matches!(result, Err(DdoptimError::UnknownProfile { .. })));
    assert_eq!(network, before);
    Ok(())
}

#[test]
fn size_all_totals_buffered_nodes() -> TestResult {
    let mut network: Network = bike_chain();
    network.node_mut("roue")?.has_buffer = true;
    Pipeline::default().recompute(&mut network)?;

    let summary = size_all(&mut network, &ProfileRegistry::standard())?;
    assert_eq!(summary.buffer_count, 1);
    assert_eq!(summary.total_inventory_value, 26600.0);
    Ok(())
}

fn profile(short: f64, medium: f64, long: f64, factors: [f64; 3], variability: f64) -> BufferProfile {
    BufferProfile {
        description: String::new(),
        dlt_threshold_short: short,
        dlt_threshold_medium: medium,
        dlt_threshold_long: long,
        lead_time_factor_short: factors[0],
        lead_time_factor_medium: factors[1],
        lead_time_factor_long: factors[2],
        variability_factor: variability,
    }
}

#[test]
fn inconsistent_profiles_are_rejected() {
    let cases = [
        profile(3.0, 3.0, 7.0, [0.7, 0.5, 0.25], 0.5),
        profile(1.0, 3.0, 7.0, [0.7, 0.5, 0.0], 0.5),
        profile(1.0, 3.0, 7.0, [0.7, 0.5, 0.25], 1.5),
        profile(1.0, 3.0, 7.0, [0.5, 0.7, 0.25], 0.5),
    ];

    for case in cases {
        let map = BTreeMap::from([(ProfileKey::from("X"), case.clone())]);
        assert!(
            matches!(ProfileRegistry::new(map), Err(DdoptimError::InvalidProfile(_))),
            "accepted {case:?}"
        );
    }
}

#[test]
fn standard_profiles_are_consistent() -> TestResult {
    let standard = ProfileRegistry::standard();
    let keys: Vec<String> = standard.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["AI", "AL", "F", "I", "U"]);

    let rebuilt = BTreeMap::from_iter(
        standard
            .keys()
            .filter_map(|k| standard.get(k).map(|p| (k.clone(), p.clone()))),
    );
    ProfileRegistry::new(rebuilt)?;
    Ok(())
}
