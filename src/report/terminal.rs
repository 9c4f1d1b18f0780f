use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::features::normalizer::NormalizeWarning;
use crate::insights::{explanation, FeatureImportance};
use crate::models::{RiskTier, ScoredRecord};
use crate::predictor::{BatchOutcome, SingleOutcome, TierSummary};
use crate::report::customer_label;
use crate::report::export::format_probability;
use crate::scoring::RiskThresholds;

const BAR_WIDTH: usize = 30;

fn header(subtitle: &str) {
    println!("\n {} v{}", "churn-checkr".bold(), env!("CARGO_PKG_VERSION"));
    println!(" {}\n", subtitle);
}

/// Render a colored terminal report for a scored batch.
pub fn render_batch(
    outcome: &BatchOutcome,
    source: &Path,
    thresholds: &RiskThresholds,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let summary = outcome.summary();

    if quiet {
        println!(
            "Total: {}  High: {}  Medium: {}  Low: {}",
            summary.total,
            summary.high.to_string().red(),
            summary.medium.to_string().yellow(),
            summary.low.to_string().green(),
        );
        return Ok(());
    }

    header(&format!("Scoring: {}", source.display()));
    write_warnings(&outcome.warnings, std::io::stdout().lock())?;
    render_summary_box(&summary, thresholds);

    if summary.high > 0 {
        println!(" {} Customers at high risk of leaving:\n", "[HIGH]".red().bold());
        render_table(&outcome.scored, Some(RiskTier::High));
        println!();
    }

    if summary.medium > 0 {
        println!(" {} Customers to monitor:\n", "[MEDIUM]".yellow().bold());
        render_table(&outcome.scored, Some(RiskTier::Medium));
        println!();
    }

    if verbose && summary.total > 0 {
        println!(" {} All customers:\n", "[ALL]".cyan().bold());
        render_table(&outcome.scored, None);
        println!();
    }

    render_call_to_action(&summary);
    Ok(())
}

fn render_summary_box(summary: &TierSummary, thresholds: &RiskThresholds) {
    let line = |symbol: ColoredString, name: &str, tier: RiskTier| {
        format!(
            "{}  {:<16}: {:>5}  ({:>5.1}%)",
            symbol,
            name,
            summary.count(tier),
            summary.percent(tier)
        )
    };

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Total customers : {}", summary.total));
    println!(" │  {:<48} │", line("✗".red(), "High risk", RiskTier::High));
    println!(" │  {:<48} │", line("⚠".yellow(), "Medium risk", RiskTier::Medium));
    println!(" │  {:<48} │", line("✓".green(), "Low risk", RiskTier::Low));
    println!(
        " │  {:<48} │",
        format!(
            "Thresholds      : medium ≥ {:.2}, high ≥ {:.2}",
            thresholds.medium, thresholds.high
        )
        .dimmed()
    );
    println!(" └────────────────────────────────────────────────────┘\n");
}

fn tier_color(tier: RiskTier) -> Color {
    match tier {
        RiskTier::High => Color::Red,
        RiskTier::Medium => Color::Yellow,
        RiskTier::Low => Color::Green,
    }
}

fn render_table(scored: &[ScoredRecord], tier_filter: Option<RiskTier>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Customer").add_attribute(Attribute::Bold),
            Cell::new("Churn Probability").add_attribute(Attribute::Bold),
            Cell::new("Risk").add_attribute(Attribute::Bold),
            Cell::new("Prediction").add_attribute(Attribute::Bold),
        ]);

    for (i, s) in scored.iter().enumerate() {
        if tier_filter.is_some_and(|t| t != s.result.tier) {
            continue;
        }
        let color = tier_color(s.result.tier);
        table.add_row(vec![
            Cell::new(customer_label(&s.record, i)),
            Cell::new(format_probability(s.result.probability)).set_alignment(CellAlignment::Right),
            Cell::new(s.result.tier.label()).fg(color),
            Cell::new(s.result.label.to_string()).fg(color),
        ]);
    }

    println!("{}", table);
}

fn render_call_to_action(summary: &TierSummary) {
    if summary.high > 0 {
        println!(
            " {} {} customers need immediate attention! Consider reaching out with retention offers.",
            "→".red(),
            summary.high
        );
    }
    if summary.medium > 0 {
        println!(
            " {} {} customers should be monitored closely with targeted engagement.",
            "→".yellow(),
            summary.medium
        );
    }
    println!(
        " {} {} customers are in good shape, perfect for upselling opportunities!\n",
        "→".green(),
        summary.low
    );
}

/// One `[WARN]` line per normalization warning, then a blank line if any.
pub fn write_warnings<W: Write>(warnings: &[NormalizeWarning], mut out: W) -> io::Result<()> {
    for w in warnings {
        writeln!(out, " {} {}", "[WARN]".yellow().bold(), w)?;
    }
    if !warnings.is_empty() {
        writeln!(out)?;
    }
    out.flush()
}

/// Text progress bar for a probability, `BAR_WIDTH` cells wide.
pub fn probability_bar(p: f64) -> String {
    let filled = ((p.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Render the result for one customer with the tier's recommended actions.
pub fn render_single(outcome: &SingleOutcome, quiet: bool) -> Result<()> {
    let r = &outcome.result;

    if quiet {
        println!("{}  {}  {}", format_probability(r.probability), r.tier.label(), r.label);
        return Ok(());
    }

    header("Single customer prediction");
    write_warnings(&outcome.warnings, std::io::stdout().lock())?;

    let headline = format!("{}: {}", r.tier.label(), r.tier.headline());
    let headline = match r.tier {
        RiskTier::High => headline.red().bold(),
        RiskTier::Medium => headline.yellow().bold(),
        RiskTier::Low => headline.green().bold(),
    };
    println!(" {}\n", headline);
    println!(" Churn probability : {}", format_probability(r.probability).bold());
    println!(" {}", probability_bar(r.probability));
    println!(" Prediction        : {}\n", r.label);

    let title = match r.tier {
        RiskTier::High => "Immediate action needed:",
        RiskTier::Medium => "Monitor closely:",
        RiskTier::Low => "Keep them happy:",
    };
    println!(" {}", title.bold());
    for action in r.tier.recommended_actions() {
        println!("   • {}", action);
    }
    println!();
    Ok(())
}

/// Ranked driver table, followed by explanations for the top five.
pub fn render_insights(ranked: &[FeatureImportance], top: usize, quiet: bool) -> Result<()> {
    let shown = &ranked[..top.min(ranked.len())];

    if quiet {
        for f in shown {
            println!("{}\t{:.3}", f.feature, f.importance);
        }
        return Ok(());
    }

    header("What drives customer churn");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Factor").add_attribute(Attribute::Bold),
            Cell::new("Feature").add_attribute(Attribute::Bold),
            Cell::new("Importance").add_attribute(Attribute::Bold),
        ]);
    for (i, f) in shown.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&f.friendly_name),
            Cell::new(&f.feature).fg(Color::DarkGrey),
            Cell::new(format!("{:.3}", f.importance)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}\n", table);

    println!(" {}", "What this means:".bold());
    for f in shown.iter().take(5) {
        println!(
            "   • {} (impact {:.1}%): {}",
            f.friendly_name.bold(),
            f.importance * 100.0,
            explanation(&f.feature)
        );
    }
    println!();
    Ok(())
}
