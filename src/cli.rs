// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::LockPolicy;

/// Command-line arguments for `ddoptim`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ddoptim",
    version,
    about = "Compute ADU, lead times and DDMRP buffer positions for a BOM network.",
    long_about = None
)]
pub struct CliArgs {
    /// Network file (JSON).
    #[arg(long, value_name = "PATH")]
    pub network: PathBuf,

    /// Settings file (TOML).
    ///
    /// Default: `Ddoptim.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seasonal multiplier applied to independent ADU. Overrides the
    /// settings file.
    #[arg(long, value_name = "X")]
    pub seasonal: Option<f64>,

    /// Place buffers automatically from customer tolerances.
    #[arg(long)]
    pub auto_position: bool,

    /// How `bufferLocked` is treated by auto-positioning. Overrides the
    /// settings file.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub lock_policy: Option<LockPolicyArg>,

    /// Write the (possibly re-positioned) network to this path.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DDOPTIM_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate, print the network, but compute nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LockPolicyArg {
    Respect,
    Ignore,
}

impl From<LockPolicyArg> for LockPolicy {
    fn from(arg: LockPolicyArg) -> Self {
        match arg {
            LockPolicyArg::Respect => LockPolicy::Respect,
            LockPolicyArg::Ignore => LockPolicy::Ignore,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
