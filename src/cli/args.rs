//! CLI argument definitions
//!
//! Global flags configure logging and the generation provider; each
//! subcommand carries its own inputs.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// adsage - agentic analyst for Facebook Ads performance data
#[derive(Parser, Debug)]
#[command(name = "adsage")]
#[command(about = "Diagnose ad performance with a resilient LLM stage pipeline")]
#[command(long_about = r#"
adsage answers questions about Facebook Ads performance exports. It plans the
analysis, summarizes the data, generates and validates hypotheses, reflects once
when confidence is low, proposes new creatives for low-CTR campaigns, and writes
a markdown report.

EXAMPLES:
  # Analyze an export with the configured provider
  adsage analyze "Why did ROAS drop last week?" --data data/ads.csv

  # Run without any provider; every stage uses its deterministic fallback
  adsage analyze "Why did ROAS drop?" --data data/ads.csv --offline

  # Validate an export and print its summary
  adsage check-data --data data/ads.csv

  # Coerce raw model output into the hypotheses contract
  adsage normalize --contract hypotheses response.txt

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .adsage/config.toml
  or config/config.yaml. Use --config to specify an explicit path.

PROVIDERS:
  auto (default) uses Groq when GROQ_API_KEY is set, else OpenAI when
  OPENAI_API_KEY is set. Use --provider or --offline to choose explicitly.
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Generation provider: auto, groq, openai or offline
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model name for the OpenAI provider
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Per-request timeout in seconds (min 5, max 3600)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full analysis pipeline and write the run artifacts
    Analyze {
        /// Question to answer about the data
        query: String,

        /// CSV export to analyze
        #[arg(long)]
        data: PathBuf,

        /// Directory for plan.json, insights.json, creatives.json and report.md
        #[arg(long)]
        output_dir: Option<Utf8PathBuf>,

        /// Skip all generation calls (overrides --provider)
        #[arg(long)]
        offline: bool,

        /// Disable the reflection pass
        #[arg(long)]
        no_reflection: bool,

        /// Confidence below which the run reflects once (0.0 to 1.0)
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Print the run result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Load and validate a CSV export and print its summary as JSON
    CheckData {
        /// CSV export to check
        #[arg(long)]
        data: PathBuf,
    },

    /// Normalize raw generated text into a contract and print it as JSON
    Normalize {
        /// Target contract: plan, hypotheses, evaluation or creatives
        #[arg(long)]
        contract: String,

        /// File holding the raw text (reads stdin when omitted)
        file: Option<PathBuf>,
    },
}

impl Commands {
    /// Operation name used in error reports.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Commands::Analyze { .. } => "analyze",
            Commands::CheckData { .. } => "check-data",
            Commands::Normalize { .. } => "normalize",
        }
    }
}
