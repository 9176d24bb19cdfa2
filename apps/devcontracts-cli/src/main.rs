use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::{SchemaCmd, ValidateCmd};

#[derive(Parser)]
#[command(name = "devcontracts", version, about = "DevContracts document utilities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a contract document or lockfile
    Validate {
        #[command(subcommand)]
        cmd: ValidateCmd,
    },
    /// Emit JSON Schema for contract documents and lockfiles
    Schema {
        #[command(subcommand)]
        cmd: SchemaCmd,
    },
}

fn main() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate { cmd } => commands::validate::execute(cmd),
        Commands::Schema { cmd } => commands::schema::execute(cmd),
    };
    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
