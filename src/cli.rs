use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "churn-checkr",
    about = "Score customers for churn risk with a pre-trained model",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding churn_model.json, encoders.json and feature_names.json
    #[arg(long, global = true, value_name = "DIR")]
    pub artifacts: Option<PathBuf>,

    /// Config file [default: ./.churn-checkr/config.toml, fallback ~/.config/churn-checkr/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Probability at which a customer becomes Medium risk
    #[arg(long, global = true, value_name = "P")]
    pub medium_threshold: Option<f64>,

    /// Probability at which a customer becomes High risk
    #[arg(long, global = true, value_name = "P")]
    pub high_threshold: Option<f64>,

    /// Show every customer and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score every row of a customer CSV
    Batch {
        /// Customer data with one row per customer
        csv: PathBuf,

        /// Report format
        #[arg(long, default_value = "terminal", value_name = "FORMAT")]
        report: ReportFormat,

        /// Output file for csv, json and pdf reports [default: stdout, or churn-report.pdf]
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Score one customer entered as FIELD=VALUE pairs
    Single {
        /// Feature value, e.g. --set Contract="One year" (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,

        /// Report format (terminal or json)
        #[arg(long, default_value = "terminal", value_name = "FORMAT")]
        report: ReportFormat,
    },

    /// Show which features drive the model's predictions
    Insights {
        /// Number of features to list
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Write a bar chart of the top features to this PNG
        #[arg(long, value_name = "FILE")]
        chart: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Csv,
    Pdf,
}

impl ReportFormat {
    /// Normalization warnings go to stderr unless the report prints them
    /// itself: only the full terminal report does.
    pub fn warnings_on_stderr(self, quiet: bool) -> bool {
        self != ReportFormat::Terminal || quiet
    }
}
