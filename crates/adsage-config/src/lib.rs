//! Configuration model, discovery, and validation for adsage
//!
//! Configuration is resolved once per process with precedence
//! CLI > config file > built-in defaults, validated, and then shared read-only.

mod discovery;
mod validation;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{AsRefStr, Display, EnumString};

pub use adsage_utils::error::ConfigError;

/// Columns the dataset is expected to carry. Only `spend`, `revenue`, `roas`
/// and `ctr` are enforced; the rest produce warnings when absent.
pub const DEFAULT_REQUIRED_COLUMNS: [&str; 15] = [
    "date",
    "campaign_name",
    "adset_name",
    "spend",
    "impressions",
    "clicks",
    "ctr",
    "purchases",
    "revenue",
    "roas",
    "creative_type",
    "creative_message",
    "audience_type",
    "platform",
    "country",
];

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub agents: AgentSettings,
    pub model: ModelSettings,
    pub llm: LlmSettings,
    pub data: DataSettings,
    pub output: OutputSettings,
    /// File the configuration was loaded from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Performance thresholds used for segment selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Click-through rate below which a row counts as low-CTR (fraction).
    pub low_ctr: f64,
    pub low_roas: f64,
    /// Rows with less spend are ignored by segment analysis.
    pub min_spend: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_ctr: 0.015,
            low_roas: 3.0,
            min_spend: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub reflection_enabled: bool,
    /// The reflection pass runs when mean confidence is strictly below this.
    pub min_confidence: f64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            reflection_enabled: true,
            min_confidence: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub name: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".to_string(),
        }
    }
}

/// Which generation provider to use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// Groq when its key is present, otherwise OpenAI
    #[default]
    Auto,
    Groq,
    OpenAi,
    /// No provider; every stage uses its deterministic fallback
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    pub timeout_secs: u64,
    pub groq: ProviderSettings,
    pub openai: ProviderSettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Auto,
            timeout_secs: 120,
            groq: ProviderSettings::default(),
            openai: ProviderSettings::default(),
        }
    }
}

/// Per-provider overrides. Unset fields use the provider's built-in defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub required_columns: Vec<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            required_columns: DEFAULT_REQUIRED_COLUMNS
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: Utf8PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: Utf8PathBuf::from("reports"),
        }
    }
}

/// CLI overrides applied on top of file configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub min_confidence: Option<f64>,
    pub no_reflection: bool,
    pub timeout_secs: Option<u64>,
    pub output_dir: Option<Utf8PathBuf>,
}

impl Config {
    /// Defaults with a short timeout, skipping discovery.
    #[cfg(any(test, feature = "test-utils"))]
    #[must_use]
    pub fn minimal_for_testing() -> Self {
        let mut config = Self::default();
        config.llm.timeout_secs = 5;
        config
    }
}
