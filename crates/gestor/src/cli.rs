//! Clap derive structures for the `gestor` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use gestor_core::{Entity, ReportKind};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gestor -- list, page through and edit business records from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "gestor",
    version,
    about = "Administer a Gestor backend from the command line",
    long_about = "Browse and edit the records of a Gestor business backend.\n\n\
        Every entity (products, sales, suppliers, ...) is a paginated\n\
        collection with the same list/next/prev/all/create/update/delete verbs.",
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
    /// API root of the backend (overrides the config file)
    #[arg(long, short = 'u', env = "GESTOR_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Config file to read instead of the default location
    #[arg(long, env = "GESTOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "GESTOR_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GESTOR_INSECURE", global = true)]
    pub insecure: bool,

    /// HTTP timeout in seconds (overrides the config file)
    #[arg(long, env = "GESTOR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Employee roles
    Role(RecordArgs),

    /// Product categories
    #[command(alias = "cat")]
    Category(RecordArgs),

    /// Customers
    Customer(RecordArgs),

    /// Payment methods
    PaymentMethod(RecordArgs),

    /// Suppliers
    Supplier(RecordArgs),

    /// Employees
    Employee(RecordArgs),

    /// Products
    #[command(alias = "prod")]
    Product(RecordArgs),

    /// Promotions
    Promotion(RecordArgs),

    /// Sales
    Sale(RecordArgs),

    /// Payments received against sales
    Payment(RecordArgs),

    /// Purchases from suppliers
    Purchase(RecordArgs),

    /// Stock levels, movements and movement history
    Stock(StockArgs),

    /// Stock movement log
    StockMovement(RecordArgs),

    /// Generated sales reports
    SalesReport(RecordArgs),

    /// Generated stock reports
    StockReport(RecordArgs),

    /// Generate reports server-side
    Report(ReportArgs),

    /// List every entity with its resource and behavior
    Entities,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Command {
    /// Split a plain entity command into its entity and record action.
    ///
    /// `stock` is excluded since it carries extra actions.
    pub fn into_records(self) -> Result<(Entity, RecordCommand), Self> {
        let (entity, args) = match self {
            Self::Role(args) => (Entity::Role, args),
            Self::Category(args) => (Entity::Category, args),
            Self::Customer(args) => (Entity::Customer, args),
            Self::PaymentMethod(args) => (Entity::PaymentMethod, args),
            Self::Supplier(args) => (Entity::Supplier, args),
            Self::Employee(args) => (Entity::Employee, args),
            Self::Product(args) => (Entity::Product, args),
            Self::Promotion(args) => (Entity::Promotion, args),
            Self::Sale(args) => (Entity::Sale, args),
            Self::Payment(args) => (Entity::Payment, args),
            Self::Purchase(args) => (Entity::Purchase, args),
            Self::StockMovement(args) => (Entity::StockMovement, args),
            Self::SalesReport(args) => (Entity::SalesReport, args),
            Self::StockReport(args) => (Entity::StockReport, args),
            other => return Err(other),
        };
        Ok((entity, args.command))
    }
}

// ── Record Commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub command: RecordCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// Show one page of records
    #[command(alias = "ls")]
    List(PageArgs),

    /// Show the page after --page
    ///
    /// Loads --page first to learn the page count, then steps forward, so
    /// this makes two requests unless --page is already the last page.
    Next(PageArgs),

    /// Show the page before --page
    ///
    /// Loads --page first, then steps back, so this makes two requests
    /// unless --page is the first page.
    Prev(PageArgs),

    /// Show the unpaginated list
    All {
        /// Bypass the cached list and fetch again
        #[arg(long)]
        refresh: bool,
    },

    /// Create a record from a JSON object
    Create(PayloadArgs),

    /// Update a record by id
    Update {
        /// Record id
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a record by id
    #[command(alias = "rm")]
    Delete {
        /// Record id
        id: String,
    },

    /// Load the choice lists this entity's form needs
    Deps,
}

/// Page selection shared by list/next/prev.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Free-text search
    #[arg(long, short = 's', default_value = "")]
    pub search: String,

    /// Ordering, e.g. `nome` or `-id` [default: per entity]
    #[arg(long)]
    pub ordering: Option<String>,
}

/// A JSON object given inline or read from a file.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// Record fields as a JSON object
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Read the JSON object from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

// ── Stock Commands ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StockArgs {
    #[command(subcommand)]
    pub command: StockCommand,
}

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    #[command(flatten)]
    Records(RecordCommand),

    /// Register a stock movement and show the reloaded stock page
    Move(PayloadArgs),

    /// Movement history of one product, newest first
    Movements {
        /// Product id
        product: String,
    },
}

// ── Report Commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: ReportCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Ask the backend to generate a report, then list the first page
    Generate {
        /// Report kind
        #[arg(value_enum)]
        kind: ReportKindArg,

        #[command(flatten)]
        payload: PayloadArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportKindArg {
    /// Sales over a date range
    Sales,
    /// Stock position
    Stock,
}

impl From<ReportKindArg> for ReportKind {
    fn from(kind: ReportKindArg) -> Self {
        match kind {
            ReportKindArg::Sales => Self::Sales,
            ReportKindArg::Stock => Self::Stock,
        }
    }
}

// ── Config Commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
