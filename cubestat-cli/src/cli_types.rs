//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cubestat_core::Scope;

#[derive(Parser)]
#[command(name = "cubestat")]
#[command(about = "Query a local mirror of the WCA results export", long_about = None)]
pub(crate) struct Cli {
    /// Settings file (defaults to ~/.config/cubestat/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the store and refresh marker
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Show a person's personal records
    Lookup {
        /// WCA id or name (full, latin or local)
        query: String,
    },

    /// Compare two people event by event
    Pk {
        /// First person (WCA id or name)
        left: String,

        /// Second person (WCA id or name)
        right: String,
    },

    /// Find everyone who beats a person in every event they share
    Nemesis {
        /// WCA id or name
        query: String,

        /// Scope to focus on: world, continent or region
        #[arg(short, long, default_value = "world")]
        scope: Scope,
    },

    /// Download the latest export and rebuild the store if it changed
    Refresh {
        /// Rebuild even if the loaded export is current
        #[arg(short, long)]
        force: bool,
    },

    /// List upcoming competitions
    Upcoming {
        /// Region name, e.g. China or 中国 (defaults to the configured region)
        #[arg(short, long)]
        region: Option<String>,

        /// How many months ahead to look
        #[arg(short, long)]
        months: Option<u32>,
    },

    /// Show the loaded store and refresh state
    Status,

    /// Keep the store fresh in the foreground until interrupted
    Serve,
}
