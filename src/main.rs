use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use sql_risk_gate::report::render_report;
use sql_risk_gate::{check_scripts, CheckOptions};

#[derive(Parser)]
#[command(name = "sql-risk-gate")]
#[command(author, version, about = "Risk gate for database migration scripts")]
#[command(group(ArgGroup::new("lineage").args(["assume_lineage", "assume_no_lineage"])))]
struct Cli {
    /// SQL files to analyze, or a single directory to search (defaults to the current directory)
    paths: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template variable override, may be repeated
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
    variables: Vec<(String, String)>,

    /// Maximum number of files taken from a directory (default 10)
    #[arg(short, long)]
    limit: Option<usize>,

    /// File name pattern used when searching a directory (default *.sql)
    #[arg(short, long)]
    pattern: Option<String>,

    /// Exclude paths matching this pattern, may be repeated
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Treat every object as having downstream consumers
    #[arg(long)]
    assume_lineage: bool,

    /// Treat every object as having no downstream consumers
    #[arg(long)]
    assume_no_lineage: bool,

    /// Also list LOW statements and approved files
    #[arg(short, long)]
    all: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_variable(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("variable name is empty in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let assume_lineage = match (cli.assume_lineage, cli.assume_no_lineage) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let options = CheckOptions {
        paths: cli.paths,
        config_path: cli.config,
        variables: cli.variables,
        limit: cli.limit,
        pattern: cli.pattern,
        exclude: cli.exclude,
        assume_lineage,
    };

    match check_scripts(&options) {
        Ok(batch) if batch.is_empty() => {
            println!("No valid SQL files to analyze");
            ExitCode::SUCCESS
        }
        Ok(batch) => {
            print!("{}", render_report(&batch, cli.all));
            if batch.requires_review() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
