use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use tracing_subscriber::EnvFilter;

use instanton_backup::backup::{ArtifactStore, BackupOptions, Inventory, run_backup};

/// Backs up the configuration of Aruba Instant On 1830 switches.
#[derive(Parser, Debug)]
#[command(name = "instanton-backup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Inventory file listing the switches
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Directory for the configuration files (overrides the inventory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Store the running config as startup config when the switch does not deliver one
    #[arg(long, action = clap::ArgAction::SetTrue)]
    startup_fallback: bool,

    /// Enable debug logging
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    /// Print the JSON schema of the inventory file and exit
    #[arg(long, action = clap::ArgAction::SetTrue)]
    print_schema: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.print_schema {
        return match Inventory::json_schema() {
            Ok(schema) => {
                println!("{schema}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("{err}");
                ExitCode::from(2)
            }
        };
    }

    let inventory = match Inventory::load(&cli.config) {
        Ok(inventory) => inventory,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };

    let dir = cli
        .output_dir
        .or(inventory.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let store = ArtifactStore::new(dir);
    let options = BackupOptions {
        startup_fallback: cli.startup_fallback || inventory.startup_fallback,
    };

    info!(
        "backing up {} switch(es) into {}",
        inventory.switches.len(),
        store.dir().display()
    );
    let summary = run_backup(&inventory.switches, &store, options).await;
    info!(
        "backup finished: {} succeeded, {} failed",
        summary.completed.len(),
        summary.failed.len()
    );

    if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Installs the log backend. `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
