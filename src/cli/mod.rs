//! Command-line interface for flybox

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::FlyScope;

/// Flybox - what can I tie with what I have?
///
/// Keep a catalog of fly patterns and an inventory of tying materials,
/// find the flies you can tie right now and the purchase that unlocks
/// the most new patterns.
#[derive(Parser, Debug)]
#[command(name = "flybox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FLYBOX_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import flies from a CSV file
    Import(ImportArgs),

    /// Export flies as CSV
    Export(ExportArgs),

    /// Browse and edit flies
    Flies(FliesArgs),

    /// Manage the material catalog
    Materials(MaterialsArgs),

    /// Manage the materials you own
    Inventory(InventoryArgs),

    /// Show flies you can tie now and flies that are close
    Tie(TieArgs),

    /// Rank materials by how many flies buying them would unlock
    Unlock(UnlockArgs),

    /// Score a material description against on-hand descriptions
    Score(ScoreArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Output format for listings and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable pretty output
    Pretty,
    /// JSON output
    Json,
}

/// Which catalog(s) to operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeFilter {
    /// Shared and personal flies
    All,
    /// Shared catalog only
    Global,
    /// Personal flies only
    Personal,
}

impl ScopeFilter {
    /// Whether a fly in `scope` passes the filter
    pub fn includes(&self, scope: FlyScope) -> bool {
        match self {
            Self::All => true,
            Self::Global => scope == FlyScope::Global,
            Self::Personal => scope == FlyScope::Personal,
        }
    }
}

/// Arguments for the import command
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// CSV file to import
    #[arg(required = true)]
    pub input: PathBuf,

    /// Import into the shared catalog instead of "My Flies"
    #[arg(short, long)]
    pub global: bool,

    /// Category for rows that leave it blank (overrides config)
    #[arg(long)]
    pub category: Option<String>,

    /// Keep material names as free text instead of linking them to the catalog
    #[arg(long)]
    pub no_resolve: bool,
}

/// Arguments for the export command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Which flies to export
    #[arg(short, long, value_enum, default_value_t = ScopeFilter::All)]
    pub scope: ScopeFilter,
}

/// Arguments for the flies command
#[derive(Parser, Debug)]
pub struct FliesArgs {
    /// Flies subcommand
    #[command(subcommand)]
    pub command: FlyCommands,
}

/// Flies subcommands
#[derive(Subcommand, Debug)]
pub enum FlyCommands {
    /// List flies
    List {
        /// Which flies to list
        #[arg(short, long, value_enum, default_value_t = ScopeFilter::All)]
        scope: ScopeFilter,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Show one fly and its materials
    Show {
        /// Fly id or name
        fly: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Add a fly to "My Flies"
    Add {
        /// Pattern name
        name: String,
        /// Category (default from config)
        #[arg(long)]
        category: Option<String>,
        /// Material as Name@Color@required|optional (repeatable)
        #[arg(short, long = "material")]
        materials: Vec<String>,
        /// Hook sizes, separated by ';' or '|'
        #[arg(long)]
        sizes: Option<String>,
        /// Add to the shared catalog
        #[arg(short, long)]
        global: bool,
    },
    /// Replace the whole material list of a personal fly
    SetMaterials {
        /// Fly id or name
        fly: String,
        /// Materials as Name@Color@required|optional
        #[arg(required = true)]
        materials: Vec<String>,
    },
    /// Delete a personal fly
    Delete {
        /// Fly id or name
        fly: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Arguments for the materials command
#[derive(Parser, Debug)]
pub struct MaterialsArgs {
    /// Materials subcommand
    #[command(subcommand)]
    pub command: MaterialCommands,
}

/// Material catalog subcommands
#[derive(Subcommand, Debug)]
pub enum MaterialCommands {
    /// Add a material to the catalog
    Add {
        /// Material name
        name: String,
        /// Color
        #[arg(long)]
        color: Option<String>,
        /// Also add it to your inventory
        #[arg(long)]
        own: bool,
    },
    /// Fuzzy search the catalog
    Search {
        /// Search text
        query: String,
        /// Maximum results to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

/// Arguments for the inventory command
#[derive(Parser, Debug)]
pub struct InventoryArgs {
    /// Inventory subcommand
    #[command(subcommand)]
    pub command: InventoryCommands,
}

/// Inventory subcommands
#[derive(Subcommand, Debug)]
pub enum InventoryCommands {
    /// Add a catalog material you own
    Add {
        /// Material id or name
        material: String,
        /// Color, to pick between same-name materials
        #[arg(long)]
        color: Option<String>,
    },
    /// Add a free-text description of something you own
    Alias {
        /// Description, e.g. "Tungsten bead 3/32 gold"
        text: String,
    },
    /// Bulk-add descriptions separated by newlines or commas
    Import {
        /// File to read (default: stdin)
        input: Option<PathBuf>,
    },
    /// Remove an inventory item
    Remove {
        /// Inventory item id
        id: String,
    },
    /// List inventory items
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

/// Arguments for the tie command
#[derive(Parser, Debug)]
pub struct TieArgs {
    /// Minimum free-text score (overrides config)
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// List flies at most this many materials away (overrides config)
    #[arg(short, long)]
    pub max_missing: Option<usize>,

    /// Which flies to consider
    #[arg(short, long, value_enum, default_value_t = ScopeFilter::All)]
    pub scope: ScopeFilter,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

/// Arguments for the unlock command
#[derive(Parser, Debug)]
pub struct UnlockArgs {
    /// Minimum free-text score (overrides config)
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Only count flies at most this many materials away (overrides config)
    #[arg(short, long)]
    pub max_missing: Option<usize>,

    /// Maximum candidates to show
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Which flies to consider
    #[arg(short, long, value_enum, default_value_t = ScopeFilter::All)]
    pub scope: ScopeFilter,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

/// Arguments for the score command
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Required material description
    #[arg(required = true)]
    pub required: String,

    /// On-hand descriptions to score against
    #[arg(required = true)]
    pub on_hand: Vec<String>,

    /// Minimum score (overrides config)
    #[arg(short, long)]
    pub threshold: Option<f32>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Reset configuration to defaults
    Reset,
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
