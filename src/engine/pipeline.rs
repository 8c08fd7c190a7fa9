// src/engine/pipeline.rs

//! Ordered recompute of every derived field.
//!
//! The pipeline is the only place that sequences the stages. Each public
//! entry point validates first, so a rejected call leaves the network exactly
//! as it was. Stage order is fixed: ADU, CLT, DLT, delivery, sizing.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::engine::adu::propagate_adu_in_order;
use crate::engine::allocation::{
    self, AllocationOptions, AllocationOutcome, validate_for_allocation,
};
use crate::engine::delivery::compute_delivery;
use crate::engine::edit::{NodeEdit, Stage, StageSet, describe};
use crate::engine::lead_time::{compute_clt_in_order, compute_dlt_in_order};
use crate::engine::metrics::NetworkMetrics;
use crate::engine::sizing::{BufferSizing, size_all};
use crate::errors::{DdoptimError, Defect, Result, ValidationErrors};
use crate::network::{Network, Node, NodeId, topological_order};
use crate::profiles::ProfileRegistry;
use crate::types::LockPolicy;

/// Run-wide knobs, usually read from the `[config]` table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub seasonal_multiplier: f64,
    pub lock_policy: LockPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            seasonal_multiplier: 1.0,
            lock_policy: LockPolicy::Respect,
        }
    }
}

impl PipelineSettings {
    /// The multiplier scales every independent ADU and must be finite and > 0.
    pub fn validate(&self) -> Result<()> {
        check_multiplier(self.seasonal_multiplier)
            .map_err(|msg| DdoptimError::ConfigError(format!("seasonal_multiplier {msg}")))
    }
}

fn check_multiplier(multiplier: f64) -> std::result::Result<(), String> {
    if multiplier > 0.0 && multiplier.is_finite() {
        Ok(())
    } else {
        Err(format!("must be > 0, got {multiplier}"))
    }
}

/// The node fields a renderer draws from.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub lead_time: f64,
    pub clt: Option<f64>,
    pub dlt: Option<f64>,
    pub has_buffer: bool,
    pub calculated_adu: Option<f64>,
    pub buffer_sizing: Option<BufferSizing>,
    pub missing_customer_lead_time: Option<f64>,
}

impl Appearance {
    pub fn of(node: &Node) -> Self {
        Self {
            lead_time: node.lead_time,
            clt: node.derived.clt,
            dlt: node.derived.dlt,
            has_buffer: node.has_buffer,
            calculated_adu: node.derived.calculated_adu,
            buffer_sizing: node.derived.buffer_sizing.clone(),
            missing_customer_lead_time: node.derived.missing_customer_lead_time,
        }
    }
}

/// Receives the ids whose [`Appearance`] changed during one pipeline call.
///
/// Called at most once per successful call, never on failure.
pub trait AppearanceObserver: Send + Sync {
    fn appearance_changed(&self, ids: &[NodeId]);
}

pub struct Pipeline {
    registry: ProfileRegistry,
    settings: PipelineSettings,
    observer: Option<Box<dyn AppearanceObserver>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            registry: ProfileRegistry::standard(),
            settings: PipelineSettings::default(),
            observer: None,
        }
    }
}

impl Pipeline {
    /// Fails with `ConfigError` when `settings` does not validate.
    pub fn new(registry: ProfileRegistry, settings: PipelineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            registry,
            settings,
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: Box<dyn AppearanceObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Full recompute of every derived field.
    pub fn recompute(&self, network: &mut Network) -> Result<NetworkMetrics> {
        self.recompute_stages(network, StageSet::ALL)?;
        Ok(NetworkMetrics::from_network(network))
    }

    /// Re-run only `stages`, in pipeline order.
    ///
    /// Callers pick the set; [`NodeEdit::affected_stages`] gives the right one
    /// for a single edit.
    pub fn recompute_stages(&self, network: &mut Network, stages: StageSet) -> Result<()> {
        if stages.is_empty() {
            return Ok(());
        }

        let order = self.check(network)?;
        let before = self.snapshot(network);

        network.rebuild_parents();
        self.run_stages(network, &order, stages)?;

        self.notify(network, before);
        Ok(())
    }

    /// Change the seasonal multiplier and refresh everything demand-driven.
    pub fn set_seasonal_multiplier(&mut self, network: &mut Network, multiplier: f64) -> Result<()> {
        check_multiplier(multiplier)
            .map_err(|msg| DdoptimError::InvalidEdit(format!("seasonal multiplier {msg}")))?;
        let previous = self.settings.seasonal_multiplier;
        self.settings.seasonal_multiplier = multiplier;
        if let Err(err) = self.recompute_stages(network, StageSet::DEMAND) {
            self.settings.seasonal_multiplier = previous;
            return Err(err);
        }
        info!(previous, multiplier, "seasonal multiplier changed");
        Ok(())
    }

    /// Place buffers from customer tolerances, then refresh every stage that
    /// depends on buffer flags.
    ///
    /// Fails without touching the network when the network is invalid or
    /// has no customer-facing node. Any node may end up buffered, so every
    /// profile key is checked up front.
    pub fn auto_position(&self, network: &mut Network) -> Result<AllocationOutcome> {
        let order = self.check(network)?;
        validate_for_allocation(network)?;
        for node in network.nodes() {
            if let Some(key) = &node.buffer_profile {
                self.registry.require(&node.id, key)?;
            }
        }

        let before = self.snapshot(network);
        network.rebuild_parents();
        self.run_stages(network, &order, StageSet::of(&[Stage::Adu, Stage::Clt]))?;

        let outcome = allocation::auto_position(
            network,
            AllocationOptions {
                lock_policy: self.settings.lock_policy,
            },
        )?;

        self.run_stages(
            network,
            &order,
            StageSet::of(&[Stage::Dlt, Stage::Delivery, Stage::Sizing]),
        )?;

        if !outcome.is_feasible() {
            warn!(
                unsolvable = outcome.unsolvable.len(),
                "some customer tolerances cannot be met"
            );
        }
        self.notify(network, before);
        Ok(outcome)
    }

    /// Undo an allocation run and refresh buffer-dependent stages.
    pub fn revert_allocation(&self, network: &mut Network, outcome: &AllocationOutcome) -> Result<()> {
        let before = self.snapshot(network);

        let mut working = network.clone();
        allocation::revert_allocation(&mut working, outcome);
        let order = self.check(&working)?;
        self.run_stages(
            &mut working,
            &order,
            StageSet::of(&[Stage::Dlt, Stage::Delivery, Stage::Sizing]),
        )?;
        *network = working;

        self.notify(network, before);
        Ok(())
    }

    /// Apply one edit and re-run exactly the stages it affects.
    ///
    /// The edit goes to a copy of the network, which replaces the original
    /// only once every stage has succeeded. Returns the stages that ran.
    pub fn apply_edit(&self, network: &mut Network, id: &str, edit: NodeEdit) -> Result<StageSet> {
        let node_id = network.node(id)?.id.clone();
        edit.validate(&node_id, network, &self.registry)?;

        let stages = edit.affected_stages();
        let label = describe(&node_id, &edit);

        let mut working = network.clone();
        match edit {
            NodeEdit::Children(children) => working.set_children(&node_id, children)?,
            other => other.apply_to(working.node_mut(&node_id)?),
        }

        if stages.is_empty() {
            *network = working;
            debug!(edit = %label, "edit applied; nothing to recompute");
            return Ok(stages);
        }

        let order = self.check(&working)?;
        let before = self.snapshot(network);

        self.run_stages(&mut working, &order, stages)?;
        *network = working;

        info!(edit = %label, %stages, "edit applied");
        self.notify(network, before);
        Ok(stages)
    }

    /// Structural checks first, then field defects, then profile keys of
    /// buffered nodes. Returns the parent-first order on success.
    fn check(&self, network: &Network) -> Result<Vec<NodeId>> {
        let defects = network.validate();

        if let Some(Defect::OrphanChild { parent, child }) =
            defects.iter().find(|d| d.is_structural()).cloned()
        {
            return Err(DdoptimError::OrphanChild { parent, child });
        }

        let order = topological_order(network)?;

        if !defects.is_empty() {
            warn!(count = defects.len(), "network validation failed");
            return Err(DdoptimError::Validation(ValidationErrors(defects)));
        }

        for node in network.nodes().filter(|n| n.has_buffer) {
            if let Some(key) = &node.buffer_profile {
                self.registry.require(&node.id, key)?;
            }
        }

        Ok(order)
    }

    fn run_stages(&self, network: &mut Network, order: &[NodeId], stages: StageSet) -> Result<()> {
        let bottom_up: Vec<NodeId> = order.iter().rev().cloned().collect();

        for stage in stages.iter() {
            debug!(%stage, "running stage");
            match stage {
                Stage::Adu => {
                    propagate_adu_in_order(network, order, self.settings.seasonal_multiplier)
                }
                Stage::Clt => compute_clt_in_order(network, &bottom_up),
                Stage::Dlt => compute_dlt_in_order(network, &bottom_up),
                Stage::Delivery => compute_delivery(network),
                Stage::Sizing => {
                    size_all(network, &self.registry)?;
                }
            }
        }
        Ok(())
    }

    fn snapshot(&self, network: &Network) -> Option<HashMap<NodeId, Appearance>> {
        self.observer.as_ref()?;
        Some(
            network
                .nodes()
                .map(|n| (n.id.clone(), Appearance::of(n)))
                .collect(),
        )
    }

    fn notify(&self, network: &Network, before: Option<HashMap<NodeId, Appearance>>) {
        let (Some(observer), Some(before)) = (self.observer.as_ref(), before) else {
            return;
        };

        let changed: Vec<NodeId> = network
            .nodes()
            .filter(|n| before.get(&n.id) != Some(&Appearance::of(n)))
            .map(|n| n.id.clone())
            .collect();

        if !changed.is_empty() {
            debug!(count = changed.len(), "appearance changed");
            observer.appearance_changed(&changed);
        }
    }
}
