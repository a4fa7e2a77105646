//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Output format for read results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadFormat {
    /// Pretty-printed JSON array
    Json,
    /// One JSON object per line (default)
    #[default]
    Jsonl,
}

/// Input format for write files.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// Detect from the file contents (default)
    #[default]
    Auto,
    /// A JSON array of records, or a single record object
    Json,
    /// One JSON record per line
    Jsonl,
}

/// Batch read/write/update/delete for Firestore-style document stores
#[derive(Parser, Debug)]
#[command(name = "docbatch", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Cloud project id (default: DOCBATCH_PROJECT or GOOGLE_CLOUD_PROJECT)
    #[arg(long, global = true, env = "DOCBATCH_PROJECT")]
    pub project: Option<String>,

    /// Database id within the project
    #[arg(long, global = true, default_value = "(default)")]
    pub database: String,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download documents from a collection
    Read(ReadArgs),

    /// Write documents from a file into a collection
    Write(WriteArgs),

    /// Update existing documents from a file
    Update(UpdateArgs),

    /// Delete documents (and their subcollections) by id
    Delete(DeleteArgs),

    /// List the collections at the store root
    List,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Collection path (e.g. "users/u1/orders")
    #[arg(short, long)]
    pub collection: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: ReadFormat,

    /// Emit timestamps as plain ISO-8601 strings instead of __timestamp__
    /// wrappers (loses the type tag; recovery on write is pattern-based)
    #[arg(short = 't', long)]
    pub timestamp_convert: bool,

    /// Emit geopoints as plain latitude/longitude maps instead of
    /// __geopoint__ wrappers (loses the type tag)
    #[arg(short = 'g', long)]
    pub geopoint_convert: bool,

    /// Emit bare payloads without document ids. A raw export cannot drive
    /// a later update or delete run
    #[arg(long)]
    pub raw: bool,

    /// Query condition "field operator value" (repeatable)
    #[arg(short = 'w', long = "where", value_name = "CONDITION")]
    pub conditions: Vec<String>,

    /// Field to order the results by
    #[arg(long)]
    pub order_by: Option<String>,

    /// Limit the number of results
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Collection path (e.g. "users/u1/orders")
    #[arg(short, long)]
    pub collection: String,

    /// Input format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: InputFormat,

    /// Field to set to the server-side write timestamp
    #[arg(long)]
    pub timestamp_field: Option<String>,

    /// Convert ISO-8601 strings in the input to native timestamps
    #[arg(short = 't', long)]
    pub timestamp_convert: bool,

    /// Convert plain latitude/longitude maps in the input to native
    /// geopoints
    #[arg(short = 'g', long)]
    pub geopoint_convert: bool,

    /// Validation command run once per record, record JSON on stdin
    #[arg(long, value_name = "COMMAND")]
    pub validator: Option<String>,

    /// Transform and count records without committing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Input file (JSON or JSONL)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Collection path (e.g. "users/u1/orders")
    #[arg(short, long)]
    pub collection: String,

    /// Insert documents that do not exist instead of failing
    #[arg(long)]
    pub upsert: bool,

    /// Field to set to the server-side update timestamp
    #[arg(long)]
    pub timestamp_field: Option<String>,

    /// Convert ISO-8601 strings in the input to native timestamps
    #[arg(short = 't', long)]
    pub timestamp_convert: bool,

    /// Convert plain latitude/longitude maps in the input to native
    /// geopoints
    #[arg(short = 'g', long)]
    pub geopoint_convert: bool,

    /// Validation command run once per record, record JSON on stdin
    #[arg(long, value_name = "COMMAND")]
    pub validator: Option<String>,

    /// Transform and count records without committing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Input file with __doc_id__/__data__ records (JSON or JSONL)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("targets").required(true).args(["doc_ids", "file"]))]
pub struct DeleteArgs {
    /// Collection path (e.g. "users/u1/orders")
    #[arg(short, long)]
    pub collection: String,

    /// Whitespace-separated document ids to delete
    #[arg(long, value_name = "IDS")]
    pub doc_ids: Option<String>,

    /// Plan the deletion without committing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Input file whose __doc_id__ fields name the documents to delete
    pub file: Option<PathBuf>,
}
