//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use roster_cli::config::{ImportSettings, parse_min_confidence};
use roster_map::CatalogProfile;

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Roster import - map spreadsheet columns and reconcile students and guardians",
    long_about = "Import student rosters from CSV, TSV, XLSX, XLS or ODS files.\n\n\
                  Columns are matched to roster fields automatically; the proposed\n\
                  mapping can be saved, reviewed and passed back to `commit`.\n\
                  Rows are committed one by one, and failed rows are reported\n\
                  without stopping the import."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow student names and contact details in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Settings file (TOML) with [mapping], [ingest] and [commit] sections.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the roster fields a column can be mapped to.
    Fields(FieldsArgs),

    /// Show the detected header row and the first rows of a file.
    Inspect(InspectArgs),

    /// Propose a column mapping for a file.
    Propose(ProposeArgs),

    /// Import a file into the roster database.
    Commit(CommitArgs),
}

#[derive(Args)]
pub struct FieldsArgs {
    /// Catalog subset to list.
    #[arg(long = "profile", value_enum)]
    pub profile: Option<ProfileArg>,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Roster file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Number of data rows to show.
    #[arg(long = "rows", default_value_t = 5)]
    pub rows: usize,
}

/// Mapping flags shared by `propose` and `commit`.
#[derive(Args)]
pub struct MappingArgs {
    /// Catalog subset to map against.
    #[arg(long = "profile", value_enum)]
    pub profile: Option<ProfileArg>,

    /// Minimum confidence (0-1) for an automatic assignment.
    #[arg(long = "min-confidence", value_name = "SCORE", value_parser = parse_min_confidence)]
    pub min_confidence: Option<f32>,
}

impl MappingArgs {
    pub fn apply(&self, settings: &mut ImportSettings) {
        if let Some(profile) = self.profile {
            settings.mapping.profile = profile.into();
        }
        if let Some(min_confidence) = self.min_confidence {
            settings.mapping.min_confidence = min_confidence;
        }
    }
}

#[derive(Args)]
pub struct ProposeArgs {
    /// Roster file to map.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Write the proposed mapping to this JSON file for review.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the full proposal (scores, samples, warnings) as JSON.
    #[arg(long = "json")]
    pub json: bool,

    #[command(flatten)]
    pub mapping: MappingArgs,
}

#[derive(Args)]
pub struct CommitArgs {
    /// Roster file to import.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Tenant that owns the imported records.
    #[arg(long = "tenant", value_name = "ID")]
    pub tenant: String,

    /// Reviewed mapping file (from `propose --output`). Without it the
    /// proposal is used as-is.
    #[arg(long = "mapping", value_name = "PATH")]
    pub mapping_file: Option<PathBuf>,

    /// Create classrooms that do not exist yet.
    #[arg(long = "create-classes")]
    pub create_classes: bool,

    /// SQLite database file.
    #[arg(long = "database", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Print the import report as JSON.
    #[arg(long = "json")]
    pub json: bool,

    #[command(flatten)]
    pub mapping: MappingArgs,
}

impl CommitArgs {
    pub fn apply(&self, settings: &mut ImportSettings) {
        self.mapping.apply(settings);
        if self.create_classes {
            settings.commit.create_classes = true;
        }
        if let Some(database) = &self.database {
            settings.commit.database.clone_from(database);
        }
    }
}

/// CLI catalog profile choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum ProfileArg {
    Full,
    Web,
}

impl From<ProfileArg> for CatalogProfile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Full => CatalogProfile::Full,
            ProfileArg::Web => CatalogProfile::Web,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
