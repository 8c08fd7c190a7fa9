// tests/pipeline.rs

use std::error::Error;

use ddoptim::engine::{
    AUTOMATIC_RATIONALE, NodeEdit, Pipeline, PipelineSettings, Stage, StageSet,
};
use ddoptim::errors::{DdoptimError, Defect};
use ddoptim::network::{ChildLink, Network};
use ddoptim::profiles::{ProfileKey, ProfileRegistry};
use ddoptim::types::LockPolicy;
use ddoptim_test_utils::builders::{NetworkBuilder, NodeBuilder};
use ddoptim_test_utils::fixtures::{bike_chain, shared_component};
use ddoptim_test_utils::{RecordingObserver, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

fn computed(mut network: Network) -> Result<Network, Box<dyn Error>> {
    Pipeline::default().recompute(&mut network)?;
    Ok(network)
}

/// Apply `edit` incrementally and compare against a from-scratch recompute.
fn assert_edit_matches_full(network: Network, id: &str, edit: NodeEdit) -> TestResult {
    let pipeline = Pipeline::default();

    let mut incremental = computed(network)?;
    let mut full = incremental.clone();

    pipeline.apply_edit(&mut incremental, id, edit.clone())?;

    match edit {
        NodeEdit::Children(children) => full.set_children(id, children)?,
        NodeEdit::LeadTime(v) => full.node_mut(id)?.lead_time = v,
        NodeEdit::IndependentAdu(v) => full.node_mut(id)?.independent_adu = v,
        NodeEdit::CustomerTolerance(v) => full.node_mut(id)?.customer_tolerance = v,
        NodeEdit::HasBuffer(v) => full.node_mut(id)?.has_buffer = v,
        NodeEdit::Moq(v) => full.node_mut(id)?.moq = v,
        NodeEdit::OrderCycle(v) => full.node_mut(id)?.order_cycle = v,
        NodeEdit::UnitCost(v) => full.node_mut(id)?.unit_cost = v,
        NodeEdit::BufferProfile(v) => full.node_mut(id)?.buffer_profile = v,
        other => panic!("edit not covered by this helper: {other:?}"),
    }
    pipeline.recompute(&mut full)?;

    assert_eq!(incremental, full);
    Ok(())
}

#[test]
fn recompute_is_idempotent() -> TestResult {
    init_tracing();

    let pipeline = Pipeline::default();
    let mut network = shared_component();
    network.node_mut("roue")?.has_buffer = true;

    let first = pipeline.recompute(&mut network)?;
    let snapshot = network.clone();
    let second = pipeline.recompute(&mut network)?;

    assert_eq!(network, snapshot);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn partial_recompute_after_edits_matches_full() -> TestResult {
    init_tracing();

    let with_tolerance = |days: f64| {
        let mut network = shared_component();
        if let Ok(velo) = network.node_mut("velo") {
            velo.customer_tolerance = Some(days);
        }
        network
    };

    assert_edit_matches_full(shared_component(), "roue", NodeEdit::LeadTime(9.0))?;
    assert_edit_matches_full(shared_component(), "velo", NodeEdit::IndependentAdu(25.0))?;
    assert_edit_matches_full(shared_component(), "jante", NodeEdit::IndependentAdu(3.0))?;
    assert_edit_matches_full(with_tolerance(12.0), "velo", NodeEdit::CustomerTolerance(Some(40.0)))?;
    assert_edit_matches_full(shared_component(), "roue", NodeEdit::HasBuffer(true))?;
    assert_edit_matches_full(shared_component(), "velo", NodeEdit::HasBuffer(true))?;
    assert_edit_matches_full(
        shared_component(),
        "roue",
        NodeEdit::Children(vec![ChildLink::new("jante", 2.0)]),
    )?;

    let mut buffered = shared_component();
    buffered.node_mut("roue")?.has_buffer = true;
    assert_edit_matches_full(buffered.clone(), "roue", NodeEdit::Moq(5000.0))?;
    assert_edit_matches_full(buffered.clone(), "roue", NodeEdit::OrderCycle(30.0))?;
    assert_edit_matches_full(buffered.clone(), "roue", NodeEdit::UnitCost(12.5))?;
    assert_edit_matches_full(buffered, "roue", NodeEdit::BufferProfile(Some(ProfileKey::from("U"))))?;
    Ok(())
}

#[test]
fn edits_report_the_stages_they_ran() -> TestResult {
    let pipeline = Pipeline::default();
    let mut network = computed(bike_chain())?;

    let stages = pipeline.apply_edit(&mut network, "roue", NodeEdit::LeadTime(6.0))?;
    assert_eq!(
        stages,
        StageSet::of(&[Stage::Clt, Stage::Dlt, Stage::Delivery, Stage::Sizing])
    );
    assert!(!stages.contains(Stage::Adu));

    let stages = pipeline.apply_edit(&mut network, "velo", NodeEdit::Name("Bike".into()))?;
    assert!(stages.is_empty());
    assert_eq!(network.node("velo")?.name, "Bike");

    let stages = pipeline.apply_edit(
        &mut network,
        "velo",
        NodeEdit::CustomerTolerance(Some(3.0)),
    )?;
    assert_eq!(stages, StageSet::of(&[Stage::Delivery]));

    let combined = NodeEdit::Moq(10.0)
        .affected_stages()
        .union(NodeEdit::CustomerTolerance(None).affected_stages());
    assert_eq!(combined, StageSet::of(&[Stage::Delivery, Stage::Sizing]));
    assert_eq!(combined.to_string(), "[delivery, sizing]");
    Ok(())
}

#[test]
fn rejected_edit_leaves_network_untouched() -> TestResult {
    init_tracing();

    let pipeline = Pipeline::default();
    let mut network = computed(bike_chain())?;
    let before = network.clone();

    let result = pipeline.apply_edit(&mut network, "roue", NodeEdit::LeadTime(0.0));
    assert!(matches!(result, Err(DdoptimError::InvalidEdit(_))));

    let result = pipeline.apply_edit(&mut network, "roue", NodeEdit::Moq(-1.0));
    assert!(matches!(result, Err(DdoptimError::InvalidEdit(_))));

    let result = pipeline.apply_edit(
        &mut network,
        "roue",
        NodeEdit::BufferProfile(Some(ProfileKey::from("ZZ"))),
    );
    assert!(matches!(result, Err(DdoptimError::UnknownProfile { .. })));

    let result = pipeline.apply_edit(
        &mut network,
        "rayons",
        NodeEdit::Children(vec![ChildLink::new("velo", 1.0)]),
    );
    assert!(matches!(result, Err(DdoptimError::Cycle(_))));

    let result = pipeline.apply_edit(
        &mut network,
        "rayons",
        NodeEdit::Children(vec![ChildLink::new("ghost", 1.0)]),
    );
    assert!(matches!(result, Err(DdoptimError::OrphanChild { .. })));

    let result = pipeline.apply_edit(&mut network, "nobody", NodeEdit::LeadTime(1.0));
    assert!(matches!(result, Err(DdoptimError::NodeNotFound(_))));

    assert_eq!(network, before);
    Ok(())
}

#[test]
fn structural_errors_are_reported_before_field_errors() {
    let pipeline = Pipeline::default();

    let mut orphan = NetworkBuilder::new()
        .with_node(NodeBuilder::new("a", 0.0).child("ghost", 1.0))
        .build();
    assert!(matches!(
        pipeline.recompute(&mut orphan),
        Err(DdoptimError::OrphanChild { .. })
    ));

    let mut cyclic = NetworkBuilder::new()
        .with_node(NodeBuilder::new("a", 0.0).child("b", 1.0))
        .with_node(NodeBuilder::new("b", 1.0).child("a", 1.0))
        .build();
    assert!(matches!(pipeline.recompute(&mut cyclic), Err(DdoptimError::Cycle(_))));
}

#[test]
fn field_errors_are_reported_together() {
    let pipeline = Pipeline::default();
    let mut network = NetworkBuilder::new()
        .with_node(NodeBuilder::new("a", 0.0).adu(-1.0).child("b", 0.0))
        .with_node(NodeBuilder::new("b", 2.0).tolerance(-3.0))
        .build();
    let before = network.clone();

    match pipeline.recompute(&mut network) {
        Err(DdoptimError::Validation(errors)) => {
            let defects = errors.defects();
            assert_eq!(defects.len(), 4, "{defects:?}");
            assert!(defects.iter().any(|d| matches!(d, Defect::NonPositiveQuantity { .. })));
            assert!(defects.iter().any(|d| matches!(d, Defect::NonPositiveLeadTime { .. })));
            assert!(defects.iter().any(|d| matches!(d, Defect::NegativeTolerance { .. })));
            assert!(defects
                .iter()
                .any(|d| matches!(d, Defect::NegativeField { field: "independentADU", .. })));
        }
        other => panic!("Expected Validation error, got: {:?}", other),
    }
    assert_eq!(network, before);
}

#[test]
fn auto_position_refreshes_dependent_stages() -> TestResult {
    init_tracing();

    let pipeline = Pipeline::default();
    let mut network = bike_chain();
    network.node_mut("velo")?.customer_tolerance = Some(5.0);

    let outcome = pipeline.auto_position(&mut network)?;

    assert_eq!(outcome.diff.added, vec!["roue".to_string()]);
    let velo = network.node("velo")?;
    assert_eq!(velo.derived.dlt, Some(5.0));
    assert_eq!(velo.derived.delivery_lead_time, Some(5.0));
    assert_eq!(velo.derived.missing_customer_lead_time, Some(0.0));

    let roue = network.node("roue")?;
    assert!(roue.derived.buffer_sizing.is_some());
    assert_eq!(roue.buffer_rationale, AUTOMATIC_RATIONALE);
    Ok(())
}

#[test]
fn auto_position_is_idempotent() -> TestResult {
    let pipeline = Pipeline::default();
    let mut network = shared_component();

    let first = pipeline.auto_position(&mut network)?;
    let snapshot = network.clone();
    let second = pipeline.auto_position(&mut network)?;

    assert_eq!(network, snapshot);
    assert_eq!(first.after, second.after);
    assert!(second.diff.added.is_empty() && second.diff.removed.is_empty());
    Ok(())
}

#[test]
fn feasible_allocation_meets_every_tolerance() -> TestResult {
    let pipeline = Pipeline::default();
    let mut network = shared_component();
    network.node_mut("trottinette")?.customer_tolerance = Some(9.0);

    let outcome = pipeline.auto_position(&mut network)?;
    let metrics = ddoptim::engine::NetworkMetrics::from_network(&network);

    assert!(outcome.is_feasible());
    assert!(metrics.tolerances_met(), "{metrics:?}");
    Ok(())
}

#[test]
fn pipeline_revert_restores_previous_results() -> TestResult {
    let pipeline = Pipeline::default();
    let mut network = bike_chain();
    network.node_mut("velo")?.customer_tolerance = Some(5.0);
    pipeline.recompute(&mut network)?;
    let before = network.clone();

    let outcome = pipeline.auto_position(&mut network)?;
    pipeline.revert_allocation(&mut network, &outcome)?;

    for (now, then) in network.nodes().zip(before.nodes()) {
        assert_eq!(now.has_buffer, then.has_buffer);
        assert_eq!(now.buffer_rationale, then.buffer_rationale);
        assert_eq!(now.derived.dlt, then.derived.dlt);
        assert_eq!(now.derived.buffer_sizing, then.derived.buffer_sizing);
    }
    Ok(())
}

#[test]
fn lock_policy_setting_reaches_allocation() -> TestResult {
    let mut network = bike_chain();
    {
        network.node_mut("velo")?.customer_tolerance = Some(30.0);
        let roue = network.node_mut("roue")?;
        roue.has_buffer = true;
        roue.buffer_locked = true;
    }

    let ignoring = Pipeline::new(
        ProfileRegistry::standard(),
        PipelineSettings {
            lock_policy: LockPolicy::Ignore,
            ..PipelineSettings::default()
        },
    )?;
    let outcome = ignoring.auto_position(&mut network)?;
    assert_eq!(outcome.diff.removed, vec!["roue".to_string()]);
    Ok(())
}

#[test]
fn pipeline_refuses_unusable_multiplier() {
    for multiplier in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let settings = PipelineSettings {
            seasonal_multiplier: multiplier,
            ..PipelineSettings::default()
        };
        match Pipeline::new(ProfileRegistry::standard(), settings) {
            Err(DdoptimError::ConfigError(msg)) => assert!(msg.contains("seasonal_multiplier"), "{msg}"),
            other => panic!("Expected ConfigError for {multiplier}, got: {:?}", other),
        }
    }
}

#[test]
fn seasonal_multiplier_change_recomputes_demand() -> TestResult {
    let mut pipeline = Pipeline::default();
    let mut network = computed(bike_chain())?;

    pipeline.set_seasonal_multiplier(&mut network, 1.3)?;
    let velo_adu = network.node("velo")?.derived.calculated_adu.unwrap_or_default();
    assert!((velo_adu - 52.0).abs() < 1e-9);

    let before = network.clone();
    let result = pipeline.set_seasonal_multiplier(&mut network, 0.0);
    assert!(matches!(result, Err(DdoptimError::InvalidEdit(_))));
    assert_eq!(network, before);
    assert_eq!(pipeline.settings().seasonal_multiplier, 1.3);
    Ok(())
}

#[test]
fn observer_hears_about_changed_nodes_only() -> TestResult {
    init_tracing();

    let recorder = RecordingObserver::new();
    let pipeline = Pipeline::default().with_observer(Box::new(recorder.clone()));
    let mut network = bike_chain();

    pipeline.recompute(&mut network)?;
    assert_eq!(recorder.calls().len(), 1);
    assert_eq!(recorder.calls()[0], vec!["velo", "roue", "rayons"]);

    // Nothing changes the second time.
    pipeline.recompute(&mut network)?;
    assert_eq!(recorder.calls().len(), 1);

    // Names are not rendering inputs.
    pipeline.apply_edit(&mut network, "velo", NodeEdit::Name("Bike".into()))?;
    assert_eq!(recorder.calls().len(), 1);

    // Buffering roue shortens velo's DLT and sizes roue; rayons is unaffected.
    pipeline.apply_edit(&mut network, "roue", NodeEdit::HasBuffer(true))?;
    assert_eq!(recorder.calls().len(), 2);
    assert_eq!(recorder.calls()[1], vec!["velo", "roue"]);

    // Failed calls stay silent.
    let _ = pipeline.apply_edit(&mut network, "roue", NodeEdit::LeadTime(-1.0));
    assert_eq!(recorder.calls().len(), 2);
    Ok(())
}
