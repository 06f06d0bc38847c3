//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Animated sorting visualizer: bubble sort blocks and binary-search-tree sort
#[derive(Parser, Debug)]
#[command(name = "sortvis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a random dataset
    Generate {
        /// Seed for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Animate one sort and print the result
    Run {
        /// Algorithm: bubble or tree
        #[arg(short, long, default_value = "bubble")]
        algorithm: String,

        /// Seed for a reproducible dataset
        #[arg(long, conflicts_with = "values")]
        seed: Option<u64>,

        /// Explicit dataset, e.g. 5,3,8,1
        #[arg(long)]
        values: Option<String>,

        /// Playback speed factor (2 runs twice as fast)
        #[arg(long)]
        speed: Option<f64>,

        /// Skip drawing and pauses, print only the result
        #[arg(long)]
        headless: bool,
    },

    /// Interactive session driven by commands on stdin
    Session {
        /// Seed for reproducible datasets
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}
