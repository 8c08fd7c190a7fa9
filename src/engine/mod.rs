// src/engine/mod.rs

//! Computation engine.
//!
//! Each stage is a plain function over `&mut Network`:
//! - [`adu`]: top-down demand propagation
//! - [`lead_time`]: bottom-up CLT and DLT
//! - [`allocation`]: buffer placement from customer tolerances
//! - [`delivery`]: delivery lead time against the tolerance
//! - [`sizing`]: red/yellow/green zones
//!
//! [`pipeline`] sequences them and is what callers normally use; [`edit`]
//! describes user edits and the stages they invalidate.

pub mod adu;
pub mod allocation;
pub mod delivery;
pub mod edit;
pub mod lead_time;
pub mod metrics;
pub mod pipeline;
pub mod sizing;

pub use adu::propagate_adu;
pub use allocation::{
    AUTOMATIC_RATIONALE, AllocationOptions, AllocationOutcome, BufferDiff, BufferState, EPSILON,
    PlacedBuffer, UnsolvableConstraint, auto_position, revert_allocation,
};
pub use delivery::compute_delivery;
pub use edit::{NodeEdit, Stage, StageSet};
pub use lead_time::{compute_clt, compute_dlt};
pub use metrics::NetworkMetrics;
pub use pipeline::{Appearance, AppearanceObserver, Pipeline, PipelineSettings};
pub use sizing::{BufferSizing, SizingSummary, size_all, size_buffer};
