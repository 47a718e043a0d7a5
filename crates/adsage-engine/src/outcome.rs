use adsage_contracts::Stage;
use adsage_llm::GenerationError;
use adsage_normalize::NormalizeError;
use std::fmt;
use tracing::{info, warn};

/// Why a stage returned its deterministic fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The generation call itself failed.
    Generation(GenerationError),
    /// The call succeeded but its text could not be normalized.
    Malformed(NormalizeError),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generation(err) => write!(f, "generation failed: {err}"),
            Self::Malformed(err) => write!(f, "malformed output: {err}"),
        }
    }
}

/// Result of one stage invocation. Both variants carry a contract-valid value.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    /// Normalized generated output.
    Success(T),
    /// Deterministic fallback used in place of generated output.
    Recovered { value: T, reason: FallbackReason },
}

impl<T> StageOutcome<T> {
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Success(_) => "generated",
            Self::Recovered { .. } => "recovered_with_fallback",
        }
    }

    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Self::Success(value) | Self::Recovered { value, .. } => value,
        }
    }

    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Self::Success(value) | Self::Recovered { value, .. } => value,
        }
    }

    pub(crate) fn log(&self, stage: Stage) {
        match self {
            Self::Success(_) => info!(stage = %stage, outcome = self.tag(), "Stage completed"),
            Self::Recovered { reason, .. } => {
                warn!(stage = %stage, outcome = self.tag(), reason = %reason, "Stage used fallback");
            }
        }
    }
}
