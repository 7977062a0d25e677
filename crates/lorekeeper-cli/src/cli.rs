//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use lorekeeper_domain::Category;
use std::path::PathBuf;

/// Lorekeeper - Build a knowledge base from long-form fiction.
#[derive(Debug, Parser)]
#[command(name = "lorekeeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Knowledge database path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// API key (overrides the profile's key)
    #[arg(long, global = true, env = "LOREKEEPER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (identifiers only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Preview how a manuscript would be chunked
    Segment(SegmentArgs),

    /// Extract knowledge from a manuscript into the database
    Import(ImportArgs),

    /// Continue a paused or failed import
    Resume,

    /// Discard a paused or failed import
    Restart,

    /// List stored entries
    Entries(EntriesArgs),

    /// List groups of entries describing the same subject
    Duplicates,

    /// Merge duplicate groups into single entries
    Merge(MergeArgs),

    /// Manage API profiles
    Profile(ProfileArgs),
}

/// Arguments for the segment command.
#[derive(Debug, Parser)]
pub struct SegmentArgs {
    /// Manuscript (.txt or .docx)
    pub file: PathBuf,

    /// Maximum chunk length in characters
    #[arg(short, long)]
    pub max_chunk_length: Option<usize>,
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// Manuscript (.txt or .docx)
    pub file: PathBuf,

    /// Maximum chunk length in characters
    #[arg(short, long)]
    pub max_chunk_length: Option<usize>,

    /// Print extracted items without touching the database
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the entries command.
#[derive(Debug, Parser)]
pub struct EntriesArgs {
    /// Only show this category (e.g. "character profile")
    #[arg(short = 't', long)]
    pub category: Option<Category>,
}

/// Arguments for the merge command.
#[derive(Debug, Parser)]
#[command(group(
    clap::ArgGroup::new("target")
        .required(true)
        .multiple(false)
        .args(["group", "all"])
))]
pub struct MergeArgs {
    /// Group number as shown by `duplicates`
    #[arg(short, long)]
    pub group: Option<usize>,

    /// Merge every group
    #[arg(short, long)]
    pub all: bool,

    /// Remove the original entries after merging
    #[arg(long)]
    pub delete_originals: bool,
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Chat-completions endpoint
        #[arg(short, long)]
        url: Option<String>,
        /// Model name
        #[arg(short, long)]
        model: Option<String>,
        /// API key stored in the profile
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
