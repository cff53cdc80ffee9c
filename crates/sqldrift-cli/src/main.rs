//! sqldrift CLI
//!
//! Command-line tool that diffs two schema-model files and prints the
//! dialect-correct DDL migrating one into the other.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sqldrift_cli::{dialect_by_name, load_database, plan_changes, plan_script, DIALECTS};

/// Cross-dialect schema migration planner.
#[derive(Parser)]
#[command(name = "sqldrift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the DDL script migrating the current schema to the
    /// desired one.
    Plan {
        /// Current schema model (JSON file).
        #[arg(short, long)]
        current: PathBuf,

        /// Desired schema model (JSON file).
        #[arg(short, long)]
        desired: PathBuf,

        /// Target dialect.
        #[arg(long, default_value = "derby")]
        dialect: String,

        /// Treat identifiers as delimited (quoted, case-sensitive).
        #[arg(long)]
        delimited_identifiers: bool,

        /// Write the script to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the detected structural changes without generating SQL.
    Diff {
        /// Current schema model (JSON file).
        #[arg(short, long)]
        current: PathBuf,

        /// Desired schema model (JSON file).
        #[arg(short, long)]
        desired: PathBuf,

        /// Target dialect.
        #[arg(long, default_value = "derby")]
        dialect: String,

        /// Treat identifiers as delimited (quoted, case-sensitive).
        #[arg(long)]
        delimited_identifiers: bool,
    },

    /// List supported dialects.
    Dialects,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Plan {
            current,
            desired,
            dialect,
            delimited_identifiers,
            output,
        } => {
            let dialect = dialect_by_name(&dialect, delimited_identifiers)?;
            let current = load_database(&current)?;
            let desired = load_database(&desired)?;
            let script = plan_script(&current, &desired, dialect.as_ref())?;

            if script.is_empty() {
                info!("Schemas are already in sync.");
            }
            match output {
                Some(path) => {
                    std::fs::write(&path, script.to_string())?;
                    info!("Wrote {} statements to {}", script.len(), path.display());
                }
                None => print!("{script}"),
            }
        }

        Commands::Diff {
            current,
            desired,
            dialect,
            delimited_identifiers,
        } => {
            let dialect = dialect_by_name(&dialect, delimited_identifiers)?;
            let current = load_database(&current)?;
            let desired = load_database(&desired)?;
            let changes = plan_changes(&current, &desired, dialect.as_ref())?;

            if changes.is_empty() {
                println!("No changes.");
            } else {
                for change in &changes {
                    println!("{change}");
                }
            }
        }

        Commands::Dialects => {
            for name in DIALECTS {
                println!("{name}");
            }
        }
    }

    Ok(())
}
