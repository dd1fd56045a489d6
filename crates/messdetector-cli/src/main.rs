//! messdetector CLI - PHP mess detector
//!
//! Available rules:
//! - UndefinedVariable: local variables read before any definition
//! - UnreachableCode: statements after a `return` or `throw`

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use messdetector_analyze::config::Config;
use messdetector_analyze::logging;
use messdetector_analyze::output::{format_issues, OutputFormat};
use messdetector_analyze::Analyzer;

#[derive(Parser)]
#[command(name = "messdetector")]
#[command(version)]
#[command(about = "Detects undefined variables and unreachable code in PHP")]
struct Cli {
    /// Files or directories to analyze
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Output format: text, raw, json, github
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    format: String,

    /// Path to config file (default: auto-detect .messdetector.toml)
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// Rules to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// Treat the third argument of preg_match/preg_match_all as defined
    #[arg(long)]
    ignore_preg_match: bool,

    /// Write a debug log (default: a timestamped file in the temp directory)
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    debug_log: Option<Option<PathBuf>>,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.list_rules {
        list_rules();
        return Ok(ExitCode::SUCCESS);
    }

    let output_format = OutputFormat::from_str(&cli.format).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid output format '{}'. Valid options: text, raw, json, github",
            cli.format
        )
    })?;
    let chatty = cli.verbose && output_format == OutputFormat::Table;

    if let Some(log_path) = &cli.debug_log {
        match logging::init_logger(log_path.as_deref()) {
            Ok(path) => {
                if chatty {
                    println!("{}: {}", "Debug log".bold(), path.display());
                }
            }
            Err(e) => {
                eprintln!("{}: Failed to initialize debug log: {}", "Warning".yellow(), e);
            }
        }
    }

    let config = load_config(&cli, chatty)?;
    let exclude_count = config.paths.exclude.len();
    let mut analyzer = Analyzer::new(config);

    for rule in &cli.rule {
        if analyzer.registry().get(rule).is_none() {
            eprintln!(
                "{}: Unknown rule '{}'. Use --list-rules to see available rules.",
                "Error".red(),
                rule
            );
            return Ok(ExitCode::from(1));
        }
    }
    if !cli.rule.is_empty() {
        analyzer.set_rules(&cli.rule);
    }
    if cli.ignore_preg_match {
        analyzer.set_option("UndefinedVariable", "ignorePregMatch", true);
    }

    if analyzer.enabled_rules().is_empty() {
        eprintln!("{}: No rules enabled", "Error".red());
        return Ok(ExitCode::from(1));
    }

    logging::log_config_summary(analyzer.enabled_rules(), cli.paths.len(), exclude_count);

    if chatty {
        println!(
            "{}: {}",
            "Rules".bold(),
            analyzer.enabled_rules().join(", ")
        );
        println!();
    }

    let mut paths: Vec<&Path> = Vec::new();
    for path in &cli.paths {
        if path.exists() {
            paths.push(path.as_path());
        } else {
            eprintln!(
                "{}: Path does not exist: {}",
                "Warning".yellow(),
                path.display()
            );
        }
    }

    let issues = analyzer
        .analyze_paths(&paths)
        .context("Analysis failed")?;

    print!("{}", format_issues(&issues, output_format));

    if let Some(path) = logging::path() {
        if chatty {
            println!("{}: {}", "Debug log written to".bold(), path.display());
        }
    }

    Ok(if issues.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn load_config(cli: &Cli, chatty: bool) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }

    if let Some(config_path) = &cli.config {
        let config = Config::load_path(config_path)?;
        if chatty {
            println!("{}: {}", "Using config".bold(), config_path.display());
        }
        return Ok(config);
    }

    match Config::load()? {
        Some((config, path)) => {
            if chatty {
                println!("{}: {}", "Using config".bold(), path.display());
            }
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn list_rules() {
    let analyzer = Analyzer::with_defaults();
    println!("{}", "Available rules:".bold());
    for check in analyzer.registry().all_checks() {
        println!("  {} - {}", check.id().green(), check.description());
        for (name, default) in check.options() {
            println!("      {} (default: {})", name, default);
        }
    }
}
