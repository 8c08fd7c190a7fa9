// src/engine/allocation.rs

//! Decoupling-point allocation driven by required lead times (RLT).
//!
//! Customer tolerances become time budgets on customer-facing nodes. Budgets
//! flow top-down: each node spends its own lead time and hands the remainder
//! to its children, where the tightest budget among all parents wins. A node
//! whose lead time does not fit its budget must hold a buffer. When that node
//! is locked without a buffer, the requirement cannot be met and is reported.
//!
//! One pass in parent-first order is enough: a node's budget only shrinks
//! through min-merges from its parents, and all of them are visited first.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::errors::{DdoptimError, Defect, Result, ValidationErrors};
use crate::network::{Network, NodeId, parent_first_order};
use crate::types::LockPolicy;

/// Absorbs floating-point noise when comparing a budget against zero.
pub const EPSILON: f64 = 0.001;

/// Rationale written on buffers placed by the allocation run.
pub const AUTOMATIC_RATIONALE: &str = "For customer tolerance (automatic)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationOptions {
    pub lock_policy: LockPolicy,
}

/// A buffer placed by the run because the node's lead time exceeded its budget.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBuffer {
    pub node: NodeId,
    pub name: String,
    pub required_lead_time: f64,
    pub lead_time: f64,
    /// How far the lead time overshoots the budget (> 0).
    pub deficit: f64,
}

/// A locked, unbuffered node whose budget is smaller than its lead time.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsolvableConstraint {
    pub node: NodeId,
    pub name: String,
    pub required_lead_time: f64,
    pub lead_time: f64,
    pub deficit: f64,
}

/// One buffered node in a before/after snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferState {
    pub node: NodeId,
    pub locked: bool,
}

/// Buffered-node set changes caused by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferDiff {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub unchanged: Vec<NodeId>,
}

/// Everything a run produced. Unsolvable constraints are data, not errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationOutcome {
    pub placed: Vec<PlacedBuffer>,
    pub unsolvable: Vec<UnsolvableConstraint>,
    pub before: Vec<BufferState>,
    pub after: Vec<BufferState>,
    pub diff: BufferDiff,
    /// `(id, rationale)` of every node whose rationale the run cleared.
    pub rationale_snapshot: Vec<(NodeId, String)>,
    pub nodes_processed: usize,
    pub propagations: usize,
}

impl AllocationOutcome {
    /// True when every customer requirement could be met.
    pub fn is_feasible(&self) -> bool {
        self.unsolvable.is_empty()
    }
}

fn is_locked(policy: LockPolicy, buffer_locked: bool) -> bool {
    policy == LockPolicy::Respect && buffer_locked
}

/// Check that the network can be allocated and return the visiting order.
///
/// Structural failures (dangling child, cycle) are returned first. Field
/// problems are collected into one [`DdoptimError::Validation`].
pub fn validate_for_allocation(network: &Network) -> Result<Vec<NodeId>> {
    if let Some(Defect::OrphanChild { parent, child }) = network
        .validate()
        .into_iter()
        .find(|d| d.is_structural())
    {
        return Err(DdoptimError::OrphanChild { parent, child });
    }

    let customer_facing: Vec<&str> = network
        .nodes()
        .filter(|n| n.is_customer_facing())
        .map(|n| n.id.as_str())
        .collect();
    let order = parent_first_order(network, customer_facing.iter().copied())?;

    let mut defects = Vec::new();
    if customer_facing.is_empty() {
        defects.push(Defect::NoCustomerFacingNodes);
    }
    for node in network.nodes() {
        if node.is_customer_facing() {
            if let Some(tolerance) = node.customer_tolerance {
                if tolerance < 0.0 {
                    defects.push(Defect::NegativeTolerance {
                        node: node.id.clone(),
                        tolerance,
                    });
                }
            }
        }
        if !(node.lead_time > 0.0) {
            defects.push(Defect::NonPositiveLeadTime {
                node: node.id.clone(),
                lead_time: node.lead_time,
            });
        }
    }

    if !defects.is_empty() {
        warn!(count = defects.len(), "allocation validation failed");
        return Err(DdoptimError::Validation(ValidationErrors(defects)));
    }
    Ok(order)
}

/// Decide buffer placement from customer tolerances.
///
/// Mutates `has_buffer`, `buffer_rationale` and `derived.required_lead_time`.
/// Lead times and sizing are not refreshed here; see
/// [`crate::engine::Pipeline::auto_position`] for the full sequence.
/// On a validation failure nothing is mutated.
pub fn auto_position(
    network: &mut Network,
    options: AllocationOptions,
) -> Result<AllocationOutcome> {
    info!(lock_policy = ?options.lock_policy, "starting buffer auto-positioning");

    let order = validate_for_allocation(network)?;

    let before = capture_buffer_state(network);
    let rationale_snapshot = initialize(network, options.lock_policy);

    let mut outcome = propagate_requirements(network, &order, options.lock_policy);

    for placed in outcome.placed.iter() {
        if let Some(node) = network.get_node_mut(&placed.node) {
            node.buffer_rationale = AUTOMATIC_RATIONALE.to_string();
        }
    }

    let after = capture_buffer_state(network);
    outcome.diff = compare_buffer_states(&before, &after);
    outcome.before = before;
    outcome.after = after;
    outcome.rationale_snapshot = rationale_snapshot;

    info!(
        placed = outcome.placed.len(),
        unsolvable = outcome.unsolvable.len(),
        added = outcome.diff.added.len(),
        removed = outcome.diff.removed.len(),
        "buffer auto-positioning complete"
    );
    Ok(outcome)
}

/// Clear unprotected buffers and seed required lead times.
///
/// Returns the rationales that were cleared so the run can be reverted.
fn initialize(network: &mut Network, policy: LockPolicy) -> Vec<(NodeId, String)> {
    let mut snapshot = Vec::new();
    let mut reset = 0usize;
    let mut seeded = 0usize;

    for node in network.nodes_mut() {
        if !is_locked(policy, node.buffer_locked) {
            if node.has_buffer {
                reset += 1;
            }
            if !node.buffer_rationale.is_empty() {
                snapshot.push((node.id.clone(), std::mem::take(&mut node.buffer_rationale)));
            }
            node.has_buffer = false;
        }

        node.derived.required_lead_time = if node.is_customer_facing() {
            seeded += 1;
            let rlt = node.effective_tolerance();
            debug!(node = %node.id, rlt, "seeded required lead time");
            Some(rlt)
        } else {
            Some(f64::INFINITY)
        };
    }

    debug!(seeded, reset, "allocation initialised");
    snapshot
}

fn propagate_requirements(
    network: &mut Network,
    order: &[NodeId],
    policy: LockPolicy,
) -> AllocationOutcome {
    let mut outcome = AllocationOutcome::default();

    for id in order {
        let Some(node) = network.get_node_mut(id) else {
            continue;
        };

        let rlt = node.derived.required_lead_time.unwrap_or(f64::INFINITY);
        if !rlt.is_finite() {
            continue;
        }
        outcome.nodes_processed += 1;

        let remaining = rlt - node.lead_time;
        let locked = is_locked(policy, node.buffer_locked);

        if locked && node.has_buffer {
            debug!(node = %id, "locked buffer; not propagating past decoupling point");
            continue;
        }

        if remaining < -EPSILON {
            if !locked {
                node.has_buffer = true;
                debug!(node = %id, deficit = -remaining, "mandatory buffer placed");
                outcome.placed.push(PlacedBuffer {
                    node: id.clone(),
                    name: node.name.clone(),
                    required_lead_time: rlt,
                    lead_time: node.lead_time,
                    deficit: -remaining,
                });
            } else {
                warn!(
                    node = %id,
                    deficit = -remaining,
                    "unsolvable constraint: locked without buffer"
                );
                outcome.unsolvable.push(UnsolvableConstraint {
                    node: id.clone(),
                    name: node.name.clone(),
                    required_lead_time: rlt,
                    lead_time: node.lead_time,
                    deficit: -remaining,
                });
            }
            continue;
        }

        let children: Vec<NodeId> = node.children.iter().map(|c| c.id.clone()).collect();
        for child_id in children {
            let Some(child) = network.get_node_mut(&child_id) else {
                continue;
            };
            let old = child.derived.required_lead_time.unwrap_or(f64::INFINITY);
            let new = old.min(remaining);
            child.derived.required_lead_time = Some(new);

            if new < old - EPSILON {
                outcome.propagations += 1;
                debug!(from = %id, to = %child_id, old, new, "propagated required lead time");
            }
        }
    }

    debug!(
        processed = outcome.nodes_processed,
        propagations = outcome.propagations,
        "requirement propagation finished"
    );
    outcome
}

/// Buffered nodes in network order.
pub fn capture_buffer_state(network: &Network) -> Vec<BufferState> {
    network
        .nodes()
        .filter(|n| n.has_buffer)
        .map(|n| BufferState {
            node: n.id.clone(),
            locked: n.buffer_locked,
        })
        .collect()
}

pub fn compare_buffer_states(before: &[BufferState], after: &[BufferState]) -> BufferDiff {
    let before_ids: BTreeSet<&str> = before.iter().map(|b| b.node.as_str()).collect();
    let after_ids: BTreeSet<&str> = after.iter().map(|b| b.node.as_str()).collect();

    BufferDiff {
        added: after
            .iter()
            .filter(|b| !before_ids.contains(b.node.as_str()))
            .map(|b| b.node.clone())
            .collect(),
        removed: before
            .iter()
            .filter(|b| !after_ids.contains(b.node.as_str()))
            .map(|b| b.node.clone())
            .collect(),
        unchanged: after
            .iter()
            .filter(|b| before_ids.contains(b.node.as_str()))
            .map(|b| b.node.clone())
            .collect(),
    }
}

/// Undo a run: restore the buffered set and the cleared rationales.
///
/// Derived lead times and sizing are left for the caller to refresh.
pub fn revert_allocation(network: &mut Network, outcome: &AllocationOutcome) {
    let buffered_before: BTreeSet<&str> =
        outcome.before.iter().map(|b| b.node.as_str()).collect();
    let rationales: HashMap<&str, &str> = outcome
        .rationale_snapshot
        .iter()
        .map(|(id, r)| (id.as_str(), r.as_str()))
        .collect();

    for placed in outcome.placed.iter() {
        if let Some(node) = network.get_node_mut(&placed.node) {
            node.buffer_rationale.clear();
        }
    }

    for node in network.nodes_mut() {
        node.has_buffer = buffered_before.contains(node.id.as_str());
        if let Some(rationale) = rationales.get(node.id.as_str()) {
            node.buffer_rationale = rationale.to_string();
        }
    }

    info!(
        restored = outcome.before.len(),
        rationales = outcome.rationale_snapshot.len(),
        "allocation reverted"
    );
}
