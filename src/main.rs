mod command;
mod errors;
mod repl;
mod storage;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use storage::Table;

#[derive(Parser)]
#[command(name = "minidb", version, about = "A single-file, single-table embedded database.")]
struct Cli {
    /// Path to the database file. Created if it doesn't already exist.
    db_file_path: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let table = match Table::open(&cli.db_file_path) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match repl::run_stdio(table) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
