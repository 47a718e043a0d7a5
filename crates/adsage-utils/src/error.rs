use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `AdsageError` is what the CLI and library entry points surface. Errors raised
/// inside a pipeline run after the dataset precondition check never reach this
/// type: stages recover with deterministic fallbacks and the controller degrades
/// to a safe run result instead.
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration/CLI argument errors |
/// | 3 | Required dataset columns missing |
/// | 4 | No generation provider could be constructed |
/// | 5 | Raw text could not be normalized (`adsage normalize`) |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use adsage_utils::error::{AdsageError, DataError};
/// use adsage_utils::exit_codes::ExitCode;
///
/// let err = AdsageError::Data(DataError::MissingRequiredData {
///     columns: vec!["roas".to_string()],
/// });
/// assert_eq!(err.to_exit_code(), ExitCode::MISSING_DATA);
/// assert!(err.display_for_user().contains("roas"));
/// ```
#[derive(Error, Debug)]
pub enum AdsageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Data(#[from] DataError),

    #[error("Generation backend error: {0}")]
    Generation(#[from] GenerationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact write failed at {path}: {reason}")]
    ArtifactWriteFailed { path: String, reason: String },

    #[error("Could not normalize input as {contract}: {reason}")]
    NormalizationFailed { contract: String, reason: String },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Dataset,
    Generation,
    FileSystem,
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Dataset => write!(f, "Dataset"),
            Self::Generation => write!(f, "Generation"),
            Self::FileSystem => write!(f, "File System"),
            Self::Validation => write!(f, "Validation"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Unsupported configuration format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::UnsupportedFormat { extension } => {
                format!("Configuration files with extension '{extension}' are not supported")
            }
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files are TOML (.toml) or YAML (.yaml/.yml) with [thresholds], [agents], [model] and [llm] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific range requirements."
            )),
            Self::NotFound { .. } | Self::DiscoveryFailed { .. } => Some(
                "adsage searches for .adsage/config.toml starting from the current directory upward."
                    .to_string(),
            ),
            Self::UnsupportedFormat { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the file syntax with a TOML or YAML validator".to_string(),
                "Compare with the example configuration in the README".to_string(),
            ],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "low_ctr" => vec!["Use a fraction between 0 and 1 (e.g. 0.015 for 1.5%)".to_string()],
                "min_confidence" => vec!["Use a value between 0.0 and 1.0 (default 0.6)".to_string()],
                "provider" => vec![
                    "Use one of: auto, groq, openai, offline".to_string(),
                ],
                "timeout_secs" => vec!["Use a timeout between 5 and 3600 seconds".to_string()],
                _ => vec![
                    "Check the documentation for valid values for this option".to_string(),
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::NotFound { .. } => vec![
                "Create .adsage/config.toml in your project root".to_string(),
                "Use CLI flags instead of a configuration file".to_string(),
            ],
            Self::UnsupportedFormat { .. } => {
                vec!["Rename the file with a .toml, .yaml or .yml extension".to_string()]
            }
            Self::DiscoveryFailed { .. } => vec![
                "Use --config <path> to specify the configuration file explicitly".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Dataset ingestion errors
#[derive(Error, Debug)]
pub enum DataError {
    /// Critical metric columns are absent. Fatal before the pipeline starts.
    #[error("Critical columns missing: {}", columns.join(", "))]
    MissingRequiredData { columns: Vec<String> },

    #[error("Data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read CSV data: {0}")]
    Csv(String),

    #[error("Dataset has no usable rows after cleaning")]
    Empty,
}

impl UserFriendlyError for DataError {
    fn user_message(&self) -> String {
        match self {
            Self::MissingRequiredData { columns } => format!(
                "The dataset is missing required metric columns: {}",
                columns.join(", ")
            ),
            Self::NotFound { path } => format!("Data file not found: {}", path.display()),
            Self::Csv(reason) => format!("Could not read the CSV data: {reason}"),
            Self::Empty => "The dataset has no rows with spend after cleaning".to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::MissingRequiredData { .. } => Some(
                "spend, revenue, roas and ctr are required; missing metrics cannot be repaired downstream."
                    .to_string(),
            ),
            Self::Empty => Some("Rows with zero spend are removed during cleaning.".to_string()),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingRequiredData { .. } => vec![
                "Export the ads report with spend, revenue, roas and ctr columns".to_string(),
                "Check that the CSV header row uses lowercase column names".to_string(),
            ],
            Self::NotFound { .. } => vec!["Pass the CSV location with --data <path>".to_string()],
            Self::Csv(_) => vec!["Check that the file is comma-separated with a header row".to_string()],
            Self::Empty => vec!["Use a date range where campaigns had spend".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Dataset
    }
}

/// Errors from the external text-generation capability.
///
/// Every variant is recoverable inside a pipeline run: stage adapters turn them
/// into deterministic fallbacks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Transport-level failure (HTTP connectivity, malformed provider envelope)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Missing API keys or invalid provider settings
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Provider answered without any content
    #[error("Empty response from {0}")]
    EmptyResponse(String),
}

impl UserFriendlyError for GenerationError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("Generation transport error: {msg}"),
            Self::ProviderAuth(msg) => format!("Generation provider authentication failed: {msg}"),
            Self::ProviderQuota(msg) => format!("Generation provider quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("Generation provider outage: {msg}"),
            Self::Timeout { duration } => format!("Generation call timed out after {duration:?}"),
            Self::Misconfiguration(msg) => format!("Generation provider is not configured: {msg}"),
            Self::Unsupported(msg) => format!("Generation not supported: {msg}"),
            Self::EmptyResponse(provider) => format!("{provider} returned an empty response"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Misconfiguration(_) => Some(
                "adsage uses Groq when GROQ_API_KEY is set, otherwise OpenAI via OPENAI_API_KEY."
                    .to_string(),
            ),
            Self::ProviderAuth(_) => {
                Some("The provider rejected the configured API key.".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Misconfiguration(_) => vec![
                "Export GROQ_API_KEY or OPENAI_API_KEY before running".to_string(),
                "Run with --offline to use deterministic fallbacks for every stage".to_string(),
                "Set [llm] provider in .adsage/config.toml".to_string(),
            ],
            Self::ProviderAuth(_) => vec!["Check the API key value and its permissions".to_string()],
            Self::ProviderQuota(_) => vec!["Wait for the rate limit window to reset".to_string()],
            Self::Timeout { .. } => {
                vec!["Increase [llm] timeout_secs in the configuration".to_string()]
            }
            _ => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Generation
    }
}

impl UserFriendlyError for AdsageError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Data(err) => err.user_message(),
            Self::Generation(err) => err.user_message(),
            Self::Io(err) => format!("File system error: {err}"),
            Self::ArtifactWriteFailed { path, reason } => {
                format!("Failed to write {path}: {reason}")
            }
            Self::NormalizationFailed { contract, reason } => {
                format!("Input could not be normalized as {contract}: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Data(err) => err.context(),
            Self::Generation(err) => err.context(),
            Self::Io(_) | Self::ArtifactWriteFailed { .. } => None,
            Self::NormalizationFailed { .. } => Some(
                "Fence stripping, lexical repair, pattern extraction and shape correction were all attempted."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Data(err) => err.suggestions(),
            Self::Generation(err) => err.suggestions(),
            Self::Io(_) => vec!["Check file permissions and available disk space".to_string()],
            Self::ArtifactWriteFailed { .. } => vec![
                "Check that the output directory is writable".to_string(),
                "Use --output-dir to write somewhere else".to_string(),
            ],
            Self::NormalizationFailed { .. } => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Data(_) => ErrorCategory::Dataset,
            Self::Generation(_) => ErrorCategory::Generation,
            Self::Io(_) | Self::ArtifactWriteFailed { .. } => ErrorCategory::FileSystem,
            Self::NormalizationFailed { .. } => ErrorCategory::Validation,
        }
    }
}

impl AdsageError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Data(DataError::MissingRequiredData { .. }) => ExitCode::MISSING_DATA,
            Self::Data(DataError::NotFound { .. }) => ExitCode::CLI_ARGS,
            Self::Data(_) => ExitCode::INTERNAL,
            Self::Generation(_) => ExitCode::GENERATION_UNAVAILABLE,
            Self::NormalizationFailed { .. } => ExitCode::NORMALIZATION_FAILED,
            Self::Io(_) | Self::ArtifactWriteFailed { .. } => ExitCode::INTERNAL,
        }
    }
}
