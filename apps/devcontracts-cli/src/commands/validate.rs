use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use devcontracts_spec::{
    load_contract, load_tree, Contract, EdgePolicy, Lockfile, ValidateOptions, ValidationIssue,
    ValidationReport,
};
use serde::Serialize;

#[derive(Subcommand)]
pub enum ValidateCmd {
    /// Validate a contract document (contracts.toml)
    Contract(ContractValidateArgs),
    /// Validate a lockfile (contracts.lock)
    Lockfile(LockfileValidateArgs),
}

#[derive(Args, Clone)]
pub struct OutputArgs {
    /// Emit JSON instead of a human summary
    #[arg(long)]
    pub json: bool,
    /// Pretty-print JSON (only with --json)
    #[arg(long, requires = "json")]
    pub pretty: bool,
    /// Treat warnings as errors (non-zero exit)
    #[arg(long)]
    pub strict_warnings: bool,
}

#[derive(Args, Clone)]
pub struct ContractValidateArgs {
    /// Path to the contract document (TOML, JSON or YAML)
    #[arg(long, default_value = "contracts.toml")]
    pub file: PathBuf,
    /// Validation options file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Reporting for dependency edges that name a missing structure key
    #[arg(long)]
    pub edge_policy: Option<EdgePolicy>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Clone)]
pub struct LockfileValidateArgs {
    /// Path to the lockfile (TOML, JSON or YAML)
    #[arg(long, default_value = "contracts.lock")]
    pub file: PathBuf,
    /// Contract document to cross-check resolved tokens against
    #[arg(long)]
    pub contract: Option<PathBuf>,
    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute(cmd: ValidateCmd) -> Result<()> {
    match cmd {
        ValidateCmd::Contract(args) => cmd_contract(args),
        ValidateCmd::Lockfile(args) => cmd_lockfile(args),
    }
}

#[derive(Serialize)]
struct ReportOut<'a> {
    file: String,
    valid: bool,
    report: &'a ValidationReport,
}

fn resolve_options(args: &ContractValidateArgs) -> Result<ValidateOptions> {
    let options = match &args.config {
        Some(path) => ValidateOptions::from_path(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => ValidateOptions::default(),
    };
    let mut options = options.with_env_overrides()?;
    if let Some(policy) = args.edge_policy {
        options.edge_policy = policy;
    }
    tracing::debug!(edge_policy = %options.edge_policy, "validation options resolved");
    Ok(options)
}

fn cmd_contract(args: ContractValidateArgs) -> Result<()> {
    let options = resolve_options(&args)?;
    let node = load_tree(&args.file)
        .with_context(|| format!("loading contract at {}", args.file.display()))?;
    let (contract, report) = match Contract::validate(&node, &options) {
        Ok(checked) => (
            Some(checked.value),
            ValidationReport {
                errors: Vec::new(),
                warnings: checked.warnings,
            },
        ),
        Err(report) => (None, report),
    };

    if args.output.json {
        emit_json(&args.file, &report, args.output.pretty)?;
    } else {
        if let Some(contract) = &contract {
            print_contract_summary(contract);
        }
        print_human(&report);
    }
    finish("contract", &report, args.output.strict_warnings)
}

fn cmd_lockfile(args: LockfileValidateArgs) -> Result<()> {
    let node = load_tree(&args.file)
        .with_context(|| format!("loading lockfile at {}", args.file.display()))?;
    let report = match Lockfile::validate(&node) {
        Ok(checked) => {
            let mut report = ValidationReport {
                errors: Vec::new(),
                warnings: checked.warnings,
            };
            if let Some(path) = &args.contract {
                let contract = load_contract(path, &ValidateOptions::default())
                    .with_context(|| format!("loading contract at {}", path.display()))?
                    .into_inner();
                report.warnings.extend(checked.value.check_against(&contract));
            }
            if !args.output.json {
                let count = checked
                    .value
                    .resolved_tokens
                    .as_ref()
                    .map(|tokens| tokens.len())
                    .unwrap_or(0);
                println!(
                    "Lockfile: version {}, {} resolved token(s)",
                    checked.value.version.get(),
                    count
                );
            }
            report
        }
        Err(report) => report,
    };

    if args.output.json {
        emit_json(&args.file, &report, args.output.pretty)?;
    } else {
        print_human(&report);
    }
    finish("lockfile", &report, args.output.strict_warnings)
}

fn emit_json(file: &Path, report: &ValidationReport, pretty: bool) -> Result<()> {
    let out = ReportOut {
        file: file.display().to_string(),
        valid: report.errors.is_empty(),
        report,
    };
    if pretty {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

fn print_contract_summary(contract: &Contract) {
    println!(
        "Contract: {} import(s), {} token(s), {} structure entries",
        contract.contracts.len(),
        contract.tokens.as_ref().map(|t| t.len()).unwrap_or(0),
        contract.structure.as_ref().map(|s| s.len()).unwrap_or(0),
    );
    if let Some(project) = contract.metadata.get("project").and_then(|p| p.as_str()) {
        println!("- project: {}", project);
    }
}

fn print_issues(label: &str, issues: &[ValidationIssue]) {
    if issues.is_empty() {
        println!("{}: none", label);
        return;
    }
    println!("{} ({}):", label, issues.len());
    for issue in issues {
        println!("  - {}: {}", issue.field, issue.message);
    }
}

fn print_human(report: &ValidationReport) {
    print_issues("Errors", &report.errors);
    print_issues("Warnings", &report.warnings);
}

fn finish(kind: &str, report: &ValidationReport, strict_warnings: bool) -> Result<()> {
    if !report.errors.is_empty() {
        anyhow::bail!("{} has {} error(s); fix and retry", kind, report.errors.len());
    }
    if strict_warnings && !report.warnings.is_empty() {
        anyhow::bail!(
            "{} has {} warning(s) (strict); address or drop --strict-warnings",
            kind,
            report.warnings.len()
        );
    }
    Ok(())
}
