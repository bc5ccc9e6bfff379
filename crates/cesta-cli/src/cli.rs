use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cesta", version, about = "Sort grocery items into aisles")]
pub struct Cli {
    /// Log classification decisions (same as RUST_LOG=cesta=debug).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip the shared correction backend even if it is configured.
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the category of each item name.
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
        /// Ignore learned corrections.
        #[arg(long)]
        keywords_only: bool,
    },
    /// Show how an item name was classified.
    Explain {
        name: String,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Remember that an item belongs to a category.
    Learn {
        name: String,
        category: String,
        /// Also publish the correction to the shared backend.
        #[arg(long)]
        share: bool,
    },
    /// Forget every local correction.
    Forget,
    /// Fetch the shared correction snapshot and report its size.
    Sync {
        /// Rows to fetch (0 uses the configured limit).
        #[arg(long, default_value_t = 0)]
        limit: u32,
    },
    /// List categories with their icon and anchor slug.
    Categories,
    /// Print the anchor slug of a category name.
    Slug { name: String },
    /// Print the normalized form of a string.
    Normalize { text: String },
}
