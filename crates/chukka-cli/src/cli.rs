use std::path::PathBuf;

use chukka_core::EntityKind;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "chukka")]
#[command(about = "Manage polo tournament data from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name overriding the active profile
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and manage the stored session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Fetch remote records and fold them into the local database
    Pull {
        /// Limit the pull to one kind
        #[arg(value_enum)]
        kind: Option<KindArg>,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload one local record, creating or updating it remotely
    Push {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Local record id
        local_id: String,
        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a local record from JSON fields
    Add {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Record fields as JSON, e.g. '{"name": "La Aguada"}'
        #[arg(long, value_name = "JSON")]
        data: String,
    },
    /// List local records of one kind
    List {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Number of records to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Include records retired locally
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one local record in full
    Show {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Local record id
        local_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Patch a local record with JSON fields
    Edit {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Local record id
        local_id: String,
        /// Fields to change as JSON; absent fields stay untouched
        #[arg(long, value_name = "JSON")]
        data: String,
    },
    /// Delete a local record, optionally on the server too
    Delete {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Local record id
        local_id: String,
        /// Also delete the record on the server (needs a pushed record)
        #[arg(long)]
        remote: bool,
    },
    /// Retire records that no pull has returned recently
    Prune {
        /// Limit the prune to one kind
        #[arg(value_enum)]
        kind: Option<KindArg>,
        /// Records unseen for at least this many hours are retired
        #[arg(long, value_name = "HOURS")]
        older_than_hours: u32,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// One synchronized record kind, as spelled on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    Tournament,
    Club,
    Team,
    Player,
    Horse,
    Breeder,
    Field,
    Match,
    Award,
}

impl KindArg {
    #[must_use]
    pub const fn entity(self) -> EntityKind {
        match self {
            Self::Tournament => EntityKind::Tournament,
            Self::Club => EntityKind::Club,
            Self::Team => EntityKind::Team,
            Self::Player => EntityKind::Player,
            Self::Horse => EntityKind::Horse,
            Self::Breeder => EntityKind::Breeder,
            Self::Field => EntityKind::Field,
            Self::Match => EntityKind::Match,
            Self::Award => EntityKind::Award,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email/password and store the session in the keyring
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        /// Optional display name for the new account
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },
    /// Show who is signed in
    Status,
    /// Trade the stored refresh token for fresh tokens
    Refresh,
    /// Sign out and clear the stored session
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Base URL of the tournament API
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Database file this profile should use
        #[arg(long, value_name = "PATH")]
        db_path: Option<PathBuf>,
        /// Keep the current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved configuration
    Show,
}
