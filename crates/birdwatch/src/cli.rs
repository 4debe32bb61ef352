//! Clap derive structures for the `birdwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// birdwatch: field records for bird sightings
#[derive(Debug, Parser)]
#[command(
    name = "birdwatch",
    version,
    about = "Browse and curate bird sighting records from the command line",
    long_about = "A CLI for the birdwatch data service.\n\n\
        Lists birds and their sighting locations, projects them onto map\n\
        markers and climate zones, exports CSV and printable HTML, and\n\
        manages media in blob storage.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "BIRDWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Data service URL (overrides profile)
    #[arg(long, short = 'b', env = "BIRDWATCH_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Blob storage URL (overrides profile)
    #[arg(long, env = "BIRDWATCH_STORAGE", global = true)]
    pub storage: Option<String>,

    /// Caller principal (overrides profile)
    #[arg(long, env = "BIRDWATCH_PRINCIPAL", global = true)]
    pub principal: Option<String>,

    /// Bearer token
    #[arg(long, env = "BIRDWATCH_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BIRDWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "BIRDWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "BIRDWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse and edit bird records
    #[command(alias = "b")]
    Birds(BirdsArgs),

    /// Browse and edit sighting locations
    #[command(alias = "loc")]
    Locations(LocationsArgs),

    /// List map markers for mapped sightings
    Map(MapArgs),

    /// Summary counts by region, zone, and hemisphere
    Stats,

    /// Export bird records as CSV or printable HTML
    Export(ExportArgs),

    /// Upload media and resolve media URLs
    Media(MediaArgs),

    /// Show the caller's identity, role, and admin status
    Whoami,

    /// View or update the caller's profile
    Profile(ProfileArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Birds ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BirdsArgs {
    #[command(subcommand)]
    pub command: BirdsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BirdsCommand {
    /// List all birds
    #[command(alias = "ls")]
    List {
        /// Only birds whose names contain this text
        #[arg(long, short = 'n')]
        name: Option<String>,
    },

    /// Show one bird by display name
    #[command(alias = "get")]
    Show {
        /// Display name (local, English, or scientific)
        name: String,
    },

    /// Add a bird
    Add(BirdFields),

    /// Edit a bird; unspecified fields keep their current value
    Edit {
        /// Bird ID
        id: String,

        #[command(flatten)]
        fields: BirdFields,
    },

    /// Delete a bird and all its locations
    #[command(alias = "rm")]
    Delete {
        /// Bird ID
        id: String,
    },
}

/// Editable bird fields, shared by `add` and `edit`.
#[derive(Debug, Args)]
pub struct BirdFields {
    /// Create from a JSON file instead of flags
    #[arg(long, short = 'F', conflicts_with_all = ["local_name", "english_name", "scientific_name"])]
    pub from_file: Option<PathBuf>,

    #[arg(long)]
    pub local_name: Option<String>,

    #[arg(long)]
    pub arabic_name: Option<String>,

    #[arg(long)]
    pub english_name: Option<String>,

    #[arg(long)]
    pub scientific_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Image storage path (repeatable; replaces the current list)
    #[arg(long = "image")]
    pub images: Vec<String>,

    /// Audio storage path
    #[arg(long)]
    pub audio: Option<String>,
}

// ── Locations ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LocationsArgs {
    #[command(subcommand)]
    pub command: LocationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocationsCommand {
    /// List every sighting location, one row per bird and location
    #[command(alias = "ls")]
    List {
        /// Only locations of birds whose names contain this text
        #[arg(long, short = 'n')]
        name: Option<String>,
    },

    /// Add a location to a bird
    Add {
        /// Bird ID
        bird_id: String,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        #[arg(long, default_value = "")]
        place: String,

        #[arg(long, default_value = "")]
        region: String,

        #[arg(long, default_value = "")]
        landmarks: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Remove a bird's location by position
    #[command(alias = "rm")]
    Delete {
        /// Bird ID
        bird_id: String,

        /// Zero-based position in the bird's location list
        index: usize,
    },
}

// ── Map ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MapArgs {
    /// Only birds whose names contain this text
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Only this region (case-insensitive)
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    #[arg(long)]
    pub hemisphere: Option<HemisphereArg>,

    #[arg(long)]
    pub zone: Option<ZoneArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HemisphereArg {
    North,
    South,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ZoneArg {
    Tropical,
    Temperate,
    Subpolar,
    Polar,
}

// ── Export ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub format: ExportFormat,
}

#[derive(Debug, Subcommand)]
pub enum ExportFormat {
    /// UTF-8 CSV with BOM (spreadsheet friendly)
    Csv {
        /// Write to a file instead of stdout
        #[arg(long, short = 'O')]
        out: Option<PathBuf>,
    },

    /// Self-contained printable HTML document
    Html {
        /// Write to a file instead of stdout
        #[arg(long, short = 'O')]
        out: Option<PathBuf>,

        /// Document title
        #[arg(long, default_value = "Bird Records")]
        title: String,
    },
}

// ── Media ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MediaArgs {
    #[command(subcommand)]
    pub command: MediaCommand,
}

#[derive(Debug, Subcommand)]
pub enum MediaCommand {
    /// Upload a local file and register it with the backend
    Upload {
        /// Local file to upload
        file: PathBuf,

        /// Storage path (default: the file name)
        #[arg(long = "as")]
        path: Option<String>,
    },

    /// Resolve a storage path to a displayable URL
    Url {
        /// Storage path
        path: String,
    },

    /// List registered file references
    #[command(alias = "ls")]
    List,

    /// List every bird image, one row per image
    Gallery,

    /// Unregister a file reference
    #[command(alias = "rm")]
    Drop {
        /// Storage path
        path: String,
    },
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the caller's saved profile
    Show,

    /// Save the caller's display name
    Set {
        /// Display name
        name: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display the current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Set a profile value
    Set {
        /// Key (backend, storage, principal, token_env, insecure, timeout,
        /// stale_time_secs, ca_cert)
        key: String,
        /// Value
        value: String,
    },

    /// List profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a token in the system keyring
    SetToken {
        /// Profile name (default: the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
