//! diskjoin CLI
//!
//! Generates tables and joins them with either strategy.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use diskjoin::config::DEFAULT_SORT_BUFFER_RECORDS;
use diskjoin::generator::TableGenerator;
use diskjoin::{Config, Joiner, Strategy};
use tracing_subscriber::{fmt, EnvFilter};

/// diskjoin
#[derive(Parser, Debug)]
#[command(name = "diskjoin")]
#[command(about = "Join fixed-width tables in memory (hash join) or on disk (sort-merge join)")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Records held in memory by the external sorter
    #[arg(short = 'b', long, global = true, default_value_t = DEFAULT_SORT_BUFFER_RECORDS)]
    sort_buffer_records: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate two random tables
    GenerateTables {
        /// Rows per table
        row_count: u64,

        /// Keys are drawn from [0, key-interval)
        key_interval: u64,

        path_a: PathBuf,
        path_b: PathBuf,
    },

    /// Join using an in-memory hash join (for small tables)
    JoinInMemory {
        path_a: PathBuf,
        path_b: PathBuf,
        output_path: PathBuf,
    },

    /// Join using an on-disk sort-merge join (sorts both inputs in place)
    JoinOnDisk {
        path_a: PathBuf,
        path_b: PathBuf,
        output_path: PathBuf,
    },
}

fn main() {
    // Diagnostics go to stderr, confirmations to stdout
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,diskjoin=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .sort_buffer_records(args.sort_buffer_records)
        .build();

    if let Err(e) = run(config, args.command) {
        tracing::error!("{}. Closing...", e);
        process::exit(1);
    }
}

fn run(config: Config, command: Commands) -> diskjoin::Result<()> {
    match command {
        Commands::GenerateTables {
            row_count,
            key_interval,
            path_a,
            path_b,
        } => {
            let mut generator = TableGenerator::new(config.layout);
            generator.generate(&path_a, row_count, key_interval)?;
            generator.generate(&path_b, row_count, key_interval)?;
            println!(
                "Successfully wrote {} rows to {} and {}",
                row_count,
                path_a.display(),
                path_b.display()
            );
        }
        Commands::JoinInMemory {
            path_a,
            path_b,
            output_path,
        } => {
            let report = Joiner::new(config)?.join(Strategy::InMemory, &path_a, &path_b, &output_path)?;
            println!(
                "Successfully joined {} and {} in memory: {} rows written to {}",
                path_a.display(),
                path_b.display(),
                report.rows_emitted,
                output_path.display()
            );
        }
        Commands::JoinOnDisk {
            path_a,
            path_b,
            output_path,
        } => {
            let report = Joiner::new(config)?.join(Strategy::OnDisk, &path_a, &path_b, &output_path)?;
            println!(
                "Successfully merged {} and {} on disk: {} rows written to {}",
                path_a.display(),
                path_b.display(),
                report.rows_emitted,
                output_path.display()
            );
        }
    }
    Ok(())
}
