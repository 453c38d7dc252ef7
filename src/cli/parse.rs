//! CLI parse: clap types for catalog-strata. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// catalog-strata CLI - inspect layered catalog documents
#[derive(Parser)]
#[command(name = "catalog-strata")]
#[command(about = "Inspect stratified catalog documents and their resolved attributes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Catalog document (JSON)
    #[arg(long, short = 'c')]
    pub catalog: PathBuf,

    /// Extra schema documents (JSON or TOML), applied on top of the built-in schemas
    #[arg(long = "schema")]
    pub schemas: Vec<PathBuf>,

    /// Workspace root directory used for configuration lookup
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the group hierarchy
    Tree {
        /// Start from this entry instead of every root
        #[arg(long)]
        root: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show resolved attribute values of an entry
    Resolve {
        /// Entry id or share key
        entry: String,
        /// Only this attribute
        #[arg(long)]
        attribute: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the raw strata of an entry, highest precedence first
    Strata {
        /// Entry id or share key
        entry: String,
        /// Only this attribute
        #[arg(long)]
        attribute: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Load a catalog document and report warnings and unknown references
    Validate {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List registered kinds with their schemas and capabilities
    Kinds {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Apply staged stratum files to the catalog
    Load {
        /// Staged stratum files (JSON)
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Write the updated catalog document here
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
