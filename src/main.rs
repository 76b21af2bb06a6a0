//! Records Standardizer CLI - Command-line interface for birth record summaries
//!
//! Architecture: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to domain operations
//! - Handles external concerns like file I/O, process exit codes, and terminal output
//! - Library errors gain file context here before they reach the user

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use records_standardizer::{
    discover_inputs, report, OutputFormat, ReportFormatter, ReportOptions, Standardizer,
    StandardizerConfig,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Config files looked up in the working directory when `--config` is absent
const DEFAULT_CONFIGS: [&str; 3] =
    ["records_standardizer.yaml", "records_standardizer.yml", ".records_standardizer.yaml"];

/// Records Standardizer - Birth record cleaning and summary reports
#[derive(Parser)]
#[command(name = "records-standardizer")]
#[command(version)]
#[command(about = "Normalize birth-record addresses and produce monthly and per-barangay summaries")]
#[command(long_about = "Records Standardizer merges monthly birth record uploads (CSV, TSV or Excel), resolves free-text addresses to canonical barangays, removes personal data and computes facility, attendant, age and sector statistics.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge record files and print the summaries
    Process {
        /// Files or directories to read
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write an Excel workbook with both summaries and the cleaned records
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write each table as a CSV file into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormatArg,

        /// Glob patterns selecting files inside directory arguments
        #[arg(long, action = clap::ArgAction::Append)]
        include: Vec<String>,

        /// Leave the monthly summary out of the printed report
        #[arg(long)]
        no_monthly: bool,

        /// Leave the per-barangay summary out of the printed report
        #[arg(long)]
        no_district: bool,
    },

    /// Resolve one address against the taxonomy (exit code 2 when unresolved)
    Resolve {
        /// Address text
        address: String,

        /// Specific address text, searched together with the address
        #[arg(long, default_value = "")]
        specific: String,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },

    /// List districts and aliases in scan order
    Taxonomy {
        /// Show only aliases
        #[arg(long)]
        aliases_only: bool,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Csv,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.log_json);

    match run_command(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run_command(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Process { paths, output, csv_dir, format, include, no_monthly, no_district } => {
            let options = ReportOptions {
                use_colors: !cli.no_color,
                show_monthly: !no_monthly,
                show_district: !no_district,
                ..Default::default()
            };
            run_process(cli.config, paths, output, csv_dir, format, include, options)
        }
        Commands::Resolve { address, specific } => run_resolve(cli.config, &address, &specific),
        Commands::ValidateConfig { config_file } => run_validate_config(config_file.or(cli.config)),
        Commands::Taxonomy { aliases_only } => run_taxonomy(cli.config, aliases_only),
    }
}

/// Load the explicit config, else the first default file found, else built-in defaults
fn load_config(config_path: Option<PathBuf>) -> Result<StandardizerConfig> {
    if let Some(path) = config_path {
        return StandardizerConfig::load_from_file(&path)
            .with_context(|| format!("loading configuration from {}", path.display()));
    }

    for name in DEFAULT_CONFIGS {
        if Path::new(name).exists() {
            tracing::debug!("Using configuration file {}", name);
            return StandardizerConfig::load_from_file(name)
                .with_context(|| format!("loading configuration from {}", name));
        }
    }

    Ok(StandardizerConfig::default())
}

fn run_process(
    config_path: Option<PathBuf>,
    paths: Vec<PathBuf>,
    output: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
    format: OutputFormatArg,
    include: Vec<String>,
    options: ReportOptions,
) -> Result<i32> {
    let config = load_config(config_path)?;
    let standardizer = Standardizer::new_with_config(config)?;

    let files = discover_inputs(&paths, &include)?;
    if files.is_empty() {
        eprintln!("No CSV or Excel files found");
        return Ok(1);
    }

    let report = standardizer.process_paths(&files)?;

    if let Some(path) = &output {
        report::write_workbook(&report, path)
            .with_context(|| format!("writing workbook {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    }

    if let Some(dir) = &csv_dir {
        let written = report::write_csv_dir(&report, dir)
            .with_context(|| format!("writing CSV files to {}", dir.display()))?;
        eprintln!("Wrote {} files to {}", written.len(), dir.display());
    }

    let formatter = ReportFormatter::new(options);
    let mut stdout = io::stdout().lock();
    formatter.write_report(&report, format.into(), &mut stdout)?;
    writeln!(stdout)?;

    Ok(0)
}

fn run_resolve(config_path: Option<PathBuf>, address: &str, specific: &str) -> Result<i32> {
    let standardizer = Standardizer::new_with_config(load_config(config_path)?)?;
    let resolved = standardizer.resolve(address, specific);
    println!("{}", resolved);

    Ok(if resolved.is_sentinel() { 2 } else { 0 })
}

fn run_validate_config(config_path: Option<PathBuf>) -> Result<i32> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIGS[0]));

    println!("Validating configuration: {}", config_path.display());

    match StandardizerConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  Districts: {}", config.taxonomy.all_districts().len());
            println!("  Aliases: {}", config.taxonomy.aliases.len());
            println!("  Placeholders: {}", config.taxonomy.placeholders.join(", "));
            for (name, terms) in config.keywords.categories() {
                println!("  {}: {}", name, terms.join(", "));
            }
            println!("  Fingerprint: {}", config.fingerprint());
            Ok(0)
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {}", e);
            Ok(1)
        }
    }
}

fn run_taxonomy(config_path: Option<PathBuf>, aliases_only: bool) -> Result<i32> {
    let standardizer = Standardizer::new_with_config(load_config(config_path)?)?;
    let resolver = standardizer.resolver();

    println!("Aliases (checked first):");
    for (alias, district) in resolver.aliases() {
        println!("  {} -> {}", alias, district);
    }

    if !aliases_only {
        println!();
        println!("Districts:");
        for district in resolver.districts() {
            println!("  {}", district);
        }
    }

    Ok(0)
}

fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
