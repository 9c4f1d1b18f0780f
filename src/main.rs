//! `churn-checkr`: score customers for churn risk with a pre-trained classifier.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config and apply threshold overrides ([`config::load_config`]).
//! 3. Check for and load the model artifacts once ([`artifacts`]).
//! 4. Read customers from CSV ([`input::table`]) or `--set` pairs ([`input::form`]).
//! 5. Normalize and score them ([`predictor`], [`features`], [`scoring`]).
//! 6. Render the requested report ([`report`]), or the driver ranking ([`insights`]).
//! 7. Exit `0`, or `1` on any fatal error.

mod artifacts;
mod cli;
mod config;
mod error;
mod features;
mod input;
mod insights;
mod model;
mod models;
mod predictor;
mod report;
mod scoring;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artifacts::{missing_artifacts, Artifacts};
use cli::{Cli, Command, ReportFormat};
use config::{load_config, Config};
use input::form::FormInput;
use predictor::Predictor;
use report::{chart, export, pdf, terminal};
use scoring::RiskThresholds;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cwd = std::env::current_dir()?;
    let mut config = load_config(&cwd, cli.config.as_deref())?;

    // CLI flags win over the config file
    config.thresholds = RiskThresholds::new(
        cli.medium_threshold.unwrap_or(config.thresholds.medium),
        cli.high_threshold.unwrap_or(config.thresholds.high),
    )?;
    if let Some(dir) = &cli.artifacts {
        config.artifacts.dir = dir.clone();
    }

    let paths = config.artifacts.paths();
    let missing = missing_artifacts(&paths);
    if !missing.is_empty() {
        eprintln!("{} Model files not found!\n", "[ERROR]".red().bold());
        eprintln!(" The model has not been trained yet. Make sure these files exist:");
        for (kind, path) in &missing {
            eprintln!("   - {} ({})", path.display(), kind);
        }
        eprintln!("\n Run the model training script first, or point --artifacts at its output.");
        std::process::exit(1);
    }

    let artifacts = artifacts::load(&paths)?;
    let predictor = Predictor::new(&artifacts, config.thresholds);

    match &cli.command {
        Command::Batch { csv, report, output } => {
            run_batch(&cli, &artifacts, &predictor, csv, *report, output.as_deref())
        }
        Command::Single { fields, report } => {
            run_single(&cli, &config, &artifacts, &predictor, fields, *report)
        }
        Command::Insights { top, chart } => run_insights(&cli, &artifacts, *top, chart.as_deref()),
    }
}

/// `RUST_LOG` wins; otherwise errors only, or debug with `--verbose`.
fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "churn_checkr=debug" } else { "churn_checkr=error" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
    Ok(())
}

fn run_batch(
    cli: &Cli,
    artifacts: &Artifacts,
    predictor: &Predictor<'_>,
    csv: &Path,
    report: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let records = input::table::read_csv(csv).with_context(|| format!("Failed to read {}", csv.display()))?;

    let spinner = (!cli.quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Analyzing {} customers...", records.len()));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        pb
    });

    let outcome = predictor.predict_batch(records);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let outcome = outcome.context("Scoring failed")?;

    if report.warnings_on_stderr(cli.quiet) {
        terminal::write_warnings(&outcome.warnings, std::io::stderr().lock())?;
    }

    match report {
        ReportFormat::Terminal => {
            terminal::render_batch(&outcome, csv, predictor.thresholds(), cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            export::write_json(&outcome, output_writer(output)?)?;
            announce(output, cli.quiet);
        }
        ReportFormat::Csv => {
            export::write_csv(&outcome.scored, output_writer(output)?)?;
            announce(output, cli.quiet);
        }
        ReportFormat::Pdf => {
            let ranked = match artifacts.classifier.feature_importances() {
                Some(imp) => Some(insights::rank_importances(&artifacts.spec, &imp)?),
                None => None,
            };
            let pdf_path = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(report::DEFAULT_PDF_FILE));
            pdf::render(&outcome, csv, predictor.thresholds(), ranked.as_deref(), &pdf_path)?;
        }
    }
    Ok(())
}

fn run_single(
    cli: &Cli,
    config: &Config,
    artifacts: &Artifacts,
    predictor: &Predictor<'_>,
    fields: &[String],
    report: ReportFormat,
) -> Result<()> {
    let record = FormInput::new(&artifacts.spec, &artifacts.encoders, &config.form).build(fields)?;
    let outcome = predictor.predict_one(record).context("Prediction failed")?;
    if report.warnings_on_stderr(cli.quiet) {
        terminal::write_warnings(&outcome.warnings, std::io::stderr().lock())?;
    }

    match report {
        ReportFormat::Terminal => terminal::render_single(&outcome, cli.quiet),
        ReportFormat::Json => export::write_json(&outcome, std::io::stdout().lock()),
        ReportFormat::Csv | ReportFormat::Pdf => {
            bail!("single predictions support --report terminal or json")
        }
    }
}

fn run_insights(cli: &Cli, artifacts: &Artifacts, top: usize, chart_path: Option<&Path>) -> Result<()> {
    let Some(importances) = artifacts.classifier.feature_importances() else {
        println!(
            "The loaded {} model does not expose feature importances.",
            artifacts.model_kind
        );
        return Ok(());
    };
    let ranked = insights::rank_importances(&artifacts.spec, &importances)?;
    terminal::render_insights(&ranked, top, cli.quiet)?;

    if let Some(path) = chart_path {
        chart::write_png(&ranked, path)?;
        if !cli.quiet {
            eprintln!("  {} chart written to {}", "→".cyan(), path.display());
        }
    }
    Ok(())
}

fn output_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    })
}

fn announce(output: Option<&Path>, quiet: bool) {
    if let (Some(path), false) = (output, quiet) {
        eprintln!("  {} results written to {}", "→".cyan(), path.display());
    }
}
