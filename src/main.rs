use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{ValidateOptions, inspect_command, schema_command, validate_command};

#[derive(Parser)]
#[command(
    name = "bdp-validate",
    about = "A CLI tool that validates budget data packages against their schema and field rules",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a package descriptor and its CSV resources
    Validate {
        /// Package directory, descriptor file, or file:// URL
        locator: String,

        /// Only check CSV headers, not values
        #[arg(long)]
        shallow: bool,

        /// JSON Schema to validate the descriptor against instead of the built-in one
        #[arg(long, env = "BDP_SCHEMA")]
        schema: Option<PathBuf>,

        /// Stop recording value violations per resource after this many
        #[arg(long, env = "BDP_LIMIT")]
        limit: Option<usize>,
    },

    /// Show each resource's category and the validator used for every field
    Inspect {
        /// Package directory, descriptor file, or file:// URL
        locator: String,
    },

    /// Print the built-in descriptor schema
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate {
            locator,
            shallow,
            schema,
            limit,
        } => validate_command(
            &locator,
            ValidateOptions {
                shallow,
                schema,
                limit,
            },
        ),
        Commands::Inspect { locator } => inspect_command(&locator),
        Commands::Schema => schema_command(),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("bdp_validate=warn"), // Default: warnings and errors only
        1 => EnvFilter::new("bdp_validate=info"), // -v: info messages
        _ => EnvFilter::new("bdp_validate=debug"), // -vv or more: full debug
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
