use clap::{Args, Parser, Subcommand, ValueEnum};
use selector::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

/// Exit status for invalid selection options or unmatched patterns
const USAGE_ERROR: u8 = 4;

#[derive(Parser)]
#[command(name = "test-select")]
#[command(about = "Select or deselect collected tests using patterns from a file")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a list of test node ids, one per line
    Filter {
        #[command(flatten)]
        selection: SelectionArgs,
        /// File with collected node ids (reads stdin if omitted)
        #[arg(long, value_name = "FILE")]
        items: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Print the run header line for the given options
    Header {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Print the patterns a selection file yields
    Patterns {
        /// Selection file to read
        file: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct SelectionArgs {
    /// Select tests given in file. One line per test name.
    #[arg(long, value_name = "FILE")]
    select_from_file: Option<PathBuf>,
    /// Deselect tests given in file. One line per test name.
    #[arg(long, value_name = "FILE")]
    deselect_from_file: Option<PathBuf>,
    /// Fail instead of warn when not all (de-)selected tests could be found.
    #[arg(long)]
    select_fail_on_missing: bool,
    /// TOML file with a [select] table providing defaults for the options above
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl SelectionArgs {
    fn resolve(&self) -> SelectResult<SelectConfig> {
        let base = match &self.config {
            Some(path) => SelectConfig::load(path)?,
            None => SelectConfig::default(),
        };
        let overrides = SelectConfig {
            select_from_file: self.select_from_file.clone(),
            deselect_from_file: self.deselect_from_file.clone(),
            fail_on_missing: self.select_fail_on_missing,
        };
        Ok(base.merge(overrides))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct FilterOutput {
    kept: Vec<String>,
    deselected: Vec<String>,
    unmatched_patterns: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is::<SelectError>() {
                ExitCode::from(USAGE_ERROR)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Filter {
            selection,
            items,
            format,
        } => {
            let config = selection.resolve()?;
            let collected = read_items(items.as_deref())?;
            let output = filter(&config, collected)?;
            print_output(&output, format)?;
        }
        Commands::Header { selection } => {
            let config = selection.resolve()?;
            if let Some(line) = report_header(&config)? {
                println!("{}", line);
            }
        }
        Commands::Patterns { file } => {
            let patterns = PatternSet::load(&file)?;
            for pattern in patterns.iter() {
                println!("{}", pattern);
            }
        }
    }

    Ok(())
}

fn filter(config: &SelectConfig, mut items: Vec<TestCase>) -> SelectResult<FilterOutput> {
    if let Some(line) = report_header(config)? {
        eprintln!("{}", line);
    }

    let mut deselected: Vec<TestCase> = Vec::new();
    let report = SelectionRun::new(config).apply(&mut items, &mut deselected)?;
    debug!(
        "{:?} run kept {} and deselected {} tests",
        report.mode, report.kept, report.deselected
    );

    Ok(FilterOutput {
        kept: items.into_iter().map(|item| item.node_id).collect(),
        deselected: deselected.into_iter().map(|item| item.node_id).collect(),
        unmatched_patterns: report
            .warning
            .map(UnmatchedPatterns::into_patterns)
            .unwrap_or_default(),
    })
}

fn read_items(path: Option<&Path>) -> io::Result<Vec<TestCase>> {
    let source = match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(parse_items(&source))
}

fn parse_items(source: &str) -> Vec<TestCase> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(TestCase::from_node_id)
        .collect()
}

fn print_output(output: &FilterOutput, format: OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Text => {
            for node_id in &output.kept {
                println!("{}", node_id);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(output)?);
        }
    }
    Ok(())
}
