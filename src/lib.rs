// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod network;
pub mod profiles;
pub mod types;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{Settings, export_network, load_network_from_path, resolve_settings};
use crate::engine::{AllocationOutcome, NetworkMetrics, Pipeline, PipelineSettings};
use crate::network::Network;

/// High-level entry point used by `main.rs`.
///
/// Loads the network and settings, recomputes every derived field,
/// optionally places buffers, prints a report and optionally exports.
pub fn run(args: CliArgs) -> Result<()> {
    let settings = resolve_settings(args.config.as_deref()).context("loading settings")?;
    let mut network = load_network_from_path(&args.network)
        .with_context(|| format!("loading network from {:?}", args.network))?;

    if args.dry_run {
        print_dry_run(&network, &settings);
        return Ok(());
    }

    let pipeline_settings = PipelineSettings {
        seasonal_multiplier: args
            .seasonal
            .unwrap_or(settings.config.seasonal_multiplier),
        lock_policy: args
            .lock_policy
            .map(Into::into)
            .unwrap_or(settings.config.lock_policy),
    };
    info!(?pipeline_settings, "pipeline configured");

    let pipeline = Pipeline::new(settings.profiles.clone(), pipeline_settings)
        .context("invalid pipeline settings")?;
    let mut metrics = pipeline.recompute(&mut network)?;

    if args.auto_position || settings.config.auto_position {
        let outcome = pipeline.auto_position(&mut network)?;
        print_allocation(&outcome);
        metrics = NetworkMetrics::from_network(&network);
    }

    print_report(&network);
    print_metrics(&metrics);

    if let Some(path) = args.export.as_ref() {
        export_network(&network, path).with_context(|| format!("exporting to {path:?}"))?;
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// One block per node, in network order.
fn print_report(network: &Network) {
    println!("network: {} (v{})", network.metadata.name, network.metadata.version);
    println!();

    for node in network.nodes() {
        let buffer = if node.has_buffer {
            if node.buffer_locked { " [buffer, locked]" } else { " [buffer]" }
        } else {
            ""
        };
        println!("  - {} ({}){buffer}", node.id, node.category);
        println!(
            "      lead_time: {}  adu: {}  clt: {}  dlt: {}",
            node.lead_time,
            fmt_opt(node.derived.calculated_adu),
            fmt_opt(node.derived.clt),
            fmt_opt(node.derived.dlt),
        );
        if node.is_customer_facing() {
            println!(
                "      tolerance: {}  delivery: {}  missing: {}",
                node.effective_tolerance(),
                fmt_opt(node.derived.delivery_lead_time),
                fmt_opt(node.derived.missing_customer_lead_time),
            );
        }
        if let Some(sizing) = node.derived.buffer_sizing.as_ref() {
            println!(
                "      red: {}  yellow: {}  green: {}  avg stock: {}  value: {:.2}",
                sizing.red, sizing.yellow, sizing.green, sizing.average_stock, sizing.inventory_value
            );
        }
    }
    println!();
}

fn print_metrics(metrics: &NetworkMetrics) {
    println!("metrics:");
    println!("  buffers: {}", metrics.buffer_count);
    println!("  total inventory value: {:.2}", metrics.total_inventory_value);
    println!(
        "  total missing customer lead time: {:.2}",
        metrics.total_missing_customer_lead_time
    );
    println!("  average lead time margin: {:.2}", metrics.average_lt_exceeding);
}

fn print_allocation(outcome: &AllocationOutcome) {
    println!("auto-positioning:");
    println!(
        "  added: {:?}  removed: {:?}  kept: {:?}",
        outcome.diff.added, outcome.diff.removed, outcome.diff.unchanged
    );
    for placed in outcome.placed.iter() {
        println!(
            "  placed {}: rlt {:.2} < lead time {} (deficit {:.2})",
            placed.node, placed.required_lead_time, placed.lead_time, placed.deficit
        );
    }
    for unsolvable in outcome.unsolvable.iter() {
        println!(
            "  UNSOLVABLE {}: locked without buffer, rlt {:.2} < lead time {} (deficit {:.2})",
            unsolvable.node, unsolvable.required_lead_time, unsolvable.lead_time, unsolvable.deficit
        );
    }
    println!();
}

/// Print settings and structure without computing anything.
fn print_dry_run(network: &Network, settings: &Settings) {
    println!("ddoptim dry-run");
    println!(
        "  config.seasonal_multiplier = {}",
        settings.config.seasonal_multiplier
    );
    println!("  config.lock_policy = {:?}", settings.config.lock_policy);
    println!("  config.auto_position = {}", settings.config.auto_position);
    let keys: Vec<String> = settings.profiles.keys().map(|k| k.to_string()).collect();
    println!("  profiles = {keys:?}");
    println!();

    println!("nodes ({}):", network.len());
    for node in network.nodes() {
        println!("  - {}", node.id);
        println!("      lead_time: {}", node.lead_time);
        if !node.children.is_empty() {
            let children: Vec<String> = node
                .children
                .iter()
                .map(|c| format!("{} x{}", c.id, c.quantity))
                .collect();
            println!("      children: {children:?}");
        }
        if node.is_customer_facing() {
            println!("      independent_adu: {}", node.independent_adu);
        }
        if node.has_buffer {
            println!("      has_buffer: true");
        }
        if let Some(profile) = node.buffer_profile.as_ref() {
            println!("      buffer_profile: {profile}");
        }
    }

    debug!("dry-run complete (nothing computed)");
}
