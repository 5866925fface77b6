use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use ids_loader::config::Config;
use ids_loader::detector::Threshold;
use ids_loader::error::LoadError;
use ids_loader::loader::{DetectorLoader, LoadReport, TracingLogger};
use ids_loader::plugin::TypeRegistry;

#[derive(Parser)]
#[command(name = "ids-loader")]
#[command(author, version, about = "Assemble and inspect intrusion detector configurations")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble the intrusion detector and show the result
    Check {
        /// Output format (table, json, simple)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// List registered modules and types
    Types,

    /// Generate default configuration
    GenConfig {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Table row for registered actions
#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "Action")]
    name: String,
}

/// Table row for thresholds
#[derive(Tabled)]
struct ThresholdRow {
    #[tabled(rename = "Event")]
    name: String,
    #[tabled(rename = "Count")]
    count: u32,
    #[tabled(rename = "Interval (s)")]
    interval: u64,
    #[tabled(rename = "Actions")]
    actions: String,
}

/// Table row for the type registry
#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Type")]
    type_id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Auto-load")]
    auto_load: String,
}

#[derive(Serialize)]
struct CheckSummary<'a> {
    actions: Vec<String>,
    thresholds: &'a [Threshold],
    faults: Vec<String>,
    dangling: Vec<(String, String)>,
}

/// Load the configuration named on the command line, or the default one
pub fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_or_default(),
    }
}

pub fn run_command(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Check { format } => cmd_check(config, format),
        Commands::Types => cmd_types(),
        Commands::GenConfig { output } => cmd_gen_config(config, output),
    }
}

fn cmd_check(config: Config, format: String) -> Result<()> {
    let registry = TypeRegistry::with_builtins();
    let report = DetectorLoader::new(&registry, &TracingLogger)
        .load(&config.intrusion_detector)
        .context("Failed to assemble intrusion detector")?;

    match format.as_str() {
        "json" => {
            let summary = CheckSummary {
                actions: report.detector().action_names(),
                thresholds: report.detector().thresholds(),
                faults: report.faults().iter().map(describe).collect(),
                dangling: report.dangling_references(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "simple" => {
            for name in report.detector().action_names() {
                println!("{}", name);
            }
        }
        _ => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &LoadReport) {
    let detector = report.detector();

    println!("{}", "Actions".bold());
    let rows: Vec<ActionRow> = detector
        .action_names()
        .into_iter()
        .map(|name| ActionRow { name })
        .collect();
    if rows.is_empty() {
        println!("  {}", "(none)".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }

    println!();
    println!("{}", "Thresholds".bold());
    let rows: Vec<ThresholdRow> = detector
        .thresholds()
        .iter()
        .map(|t| ThresholdRow {
            name: t.name().to_string(),
            count: t.count(),
            interval: t.interval().as_secs(),
            actions: t.actions().join(", "),
        })
        .collect();
    if rows.is_empty() {
        println!("  {}", "(none)".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }

    for (threshold, action) in report.dangling_references() {
        println!(
            "{} threshold {} references unregistered action {}",
            "note:".yellow(),
            threshold,
            action
        );
    }

    if report.is_clean() {
        println!("\n{}", "Loaded without faults".green());
    } else {
        println!("\n{}", format!("{} faults", report.faults().len()).red().bold());
        for fault in report.faults() {
            println!("  {} {}", "-".red(), describe(fault));
        }
    }
}

fn cmd_types() -> Result<()> {
    let registry = TypeRegistry::with_builtins();

    let rows: Vec<TypeRow> = registry
        .modules()
        .iter()
        .flat_map(|module| {
            module.types().iter().map(move |entry| TypeRow {
                module: module.name().to_string(),
                type_id: entry.type_id().to_string(),
                kind: entry.kind().label().to_string(),
                auto_load: module
                    .attribute(entry.type_id())
                    .filter(|attr| attr.auto_load)
                    .map(|attr| attr.name.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            })
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

fn cmd_gen_config(config: Config, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            config.save(&path)?;
            println!("Configuration written to {}", path.display());
        }
        None => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Render a load fault with its cause chain
fn describe(fault: &LoadError) -> String {
    let mut text = fault.to_string();
    let mut cause = std::error::Error::source(fault);
    while let Some(err) = cause {
        text.push_str(": ");
        text.push_str(&err.to_string());
        cause = err.source();
    }
    text
}
