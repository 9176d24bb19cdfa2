use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use devcontracts_spec::{contract_schema, lockfile_schema};

#[derive(Subcommand)]
pub enum SchemaCmd {
    /// JSON Schema for contract documents
    Contract(SchemaArgs),
    /// JSON Schema for lockfiles
    Lockfile(SchemaArgs),
}

#[derive(Args, Clone)]
pub struct SchemaArgs {
    /// Output path (writes file). If not set, prints to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn execute(cmd: SchemaCmd) -> Result<()> {
    match cmd {
        SchemaCmd::Contract(args) => write_schema(&contract_schema(), args.out.as_deref()),
        SchemaCmd::Lockfile(args) => write_schema(&lockfile_schema(), args.out.as_deref()),
    }
}

fn write_schema(schema: &serde_json::Value, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(schema)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(path, json)
                .with_context(|| format!("writing schema to {}", path.display()))?;
            tracing::debug!(path = %path.display(), "schema written");
        }
        None => println!("{}", json),
    }
    Ok(())
}
