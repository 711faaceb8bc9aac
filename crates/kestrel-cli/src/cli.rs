//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use kestrel_core::TaskType;

/// Local-first model routing across daemon, file, and cloud backends.
#[derive(Debug, Parser)]
#[command(name = "kestrel", version, about)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,

    /// Emit machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full routing pass and print the decision.
    Route {
        /// Task to route for (coding, reasoning, general, creative).
        #[arg(long)]
        task: Option<TaskType>,

        /// RAM budget in GB for candidate models.
        #[arg(long)]
        ram: Option<f64>,

        /// Minimum trust score (0-10) a model must carry.
        #[arg(long)]
        min_trust: Option<f32>,
    },

    /// List every model discovered across enabled backends.
    Models {
        /// Bypass the discovery cache.
        #[arg(long)]
        refresh: bool,
    },

    /// Pick a default model, degrading gracefully when routing fails.
    Default {
        /// Task hint for the selection.
        #[arg(long)]
        task: Option<TaskType>,

        /// Cap the RAM budget so a small model loads quickly.
        #[arg(long)]
        urgent: bool,
    },

    /// Suggest a routing configuration for this host without routing.
    Recommend {
        /// Task the configuration should be tuned for.
        #[arg(long)]
        task: Option<TaskType>,
    },
}
