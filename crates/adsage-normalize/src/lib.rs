//! Output normalization for generated stage payloads.
//!
//! [`normalize`] turns arbitrary generated text into a value satisfying one of
//! the stage contracts, or reports a [`NormalizeError`]. It never panics.
//!
//! The pipeline has three phases:
//!
//! 1. **Candidate extraction** ([`extract`]): strip code fences, slice the
//!    outermost object, parse strictly, retry after lexical repair, and as a
//!    last resort rebuild a minimal object from labeled fields.
//! 2. **Shape correction** ([`rules`]): the contract's ordered rule list.
//!    Rules are total and leave well-formed input alone, which makes
//!    normalization idempotent.
//! 3. **Validation**: the primary list must be present, be an array and hold at
//!    least one object; the result is decoded into the contract type and its
//!    invariants checked.

pub mod contracts;
pub mod extract;
pub mod rules;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

pub use contracts::{CreativesContract, EvaluationContract, HypothesesContract, PlanContract};
pub use extract::PatternSpec;
pub use rules::ShapeRule;

use adsage_contracts::ContractViolation;

/// Why generated text could not be normalized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("generated text is empty")]
    Empty,

    #[error("no structured payload found in generated text")]
    NoStructuredPayload,

    #[error("required key '{key}' is missing")]
    MissingKey { key: &'static str },

    #[error("'{key}' is not a list")]
    NotSequence { key: &'static str },

    #[error("'{key}' has no entries")]
    EmptySequence { key: &'static str },

    #[error("{contract} payload does not decode: {reason}")]
    Decode {
        contract: &'static str,
        reason: String,
    },
}

impl From<ContractViolation> for NormalizeError {
    fn from(violation: ContractViolation) -> Self {
        let contract = match &violation {
            ContractViolation::EmptyList { contract, .. }
            | ContractViolation::DuplicateId { contract, .. }
            | ContractViolation::EmptyId { contract }
            | ContractViolation::ConfidenceOutOfRange { contract, .. } => *contract,
        };
        NormalizeError::Decode {
            contract,
            reason: violation.to_string(),
        }
    }
}

/// A stage output shape the normalizer can produce.
pub trait Contract {
    type Output: Serialize + DeserializeOwned;

    const NAME: &'static str;
    /// Key of the primary list that must end up non-empty.
    const LIST_KEY: &'static str;
    const PATTERN: PatternSpec;
    const RULES: &'static [ShapeRule];

    /// Invariants beyond what decoding enforces.
    fn check(output: &Self::Output) -> Result<(), ContractViolation>;
}

/// Normalize `raw` generated text into the contract `C`.
pub fn normalize<C: Contract>(raw: &str) -> Result<C::Output, NormalizeError> {
    let value = normalize_value::<C>(raw)?;
    let output: C::Output =
        serde_json::from_value(value).map_err(|e| NormalizeError::Decode {
            contract: C::NAME,
            reason: e.to_string(),
        })?;
    C::check(&output)?;
    Ok(output)
}

/// Candidate extraction and shape correction without decoding.
pub fn normalize_value<C: Contract>(raw: &str) -> Result<Value, NormalizeError> {
    let candidate = extract_candidate(raw, &C::PATTERN)?;
    let corrected = rules::apply_rules(C::NAME, C::RULES, candidate);
    validate_list(&corrected, C::LIST_KEY)?;
    Ok(corrected)
}

fn extract_candidate(raw: &str, pattern: &PatternSpec) -> Result<Value, NormalizeError> {
    if raw.trim().is_empty() {
        return Err(NormalizeError::Empty);
    }

    let stripped = extract::strip_fences(raw);
    let sliced = extract::slice_object(stripped).or_else(|| extract::slice_object(raw));

    if let Some(sliced) = sliced {
        if let Some(value) = extract::parse_object(sliced) {
            return Ok(value);
        }
        if let Some(value) = extract::parse_object(&extract::repair_lexical(sliced)) {
            tracing::debug!("payload parsed after lexical repair");
            return Ok(value);
        }
    }

    let source = sliced.unwrap_or(stripped);
    match extract::recover_fields(source, pattern) {
        Some(value) => {
            tracing::debug!("payload rebuilt from labeled fields");
            Ok(value)
        }
        None => Err(NormalizeError::NoStructuredPayload),
    }
}

fn validate_list(value: &Value, key: &'static str) -> Result<(), NormalizeError> {
    match value.get(key) {
        None | Some(Value::Null) => Err(NormalizeError::MissingKey { key }),
        Some(Value::Array(items)) if items.iter().any(Value::is_object) => Ok(()),
        Some(Value::Array(_)) => Err(NormalizeError::EmptySequence { key }),
        Some(_) => Err(NormalizeError::NotSequence { key }),
    }
}

/// Runtime selector over the contracts, for callers that pick one by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ContractKind {
    Plan,
    Hypotheses,
    Evaluation,
    Creatives,
}

impl ContractKind {
    /// Normalize `raw` into this contract and return it re-encoded as JSON.
    pub fn normalize_to_json(self, raw: &str) -> Result<Value, NormalizeError> {
        match self {
            ContractKind::Plan => encode::<PlanContract>(raw),
            ContractKind::Hypotheses => encode::<HypothesesContract>(raw),
            ContractKind::Evaluation => encode::<EvaluationContract>(raw),
            ContractKind::Creatives => encode::<CreativesContract>(raw),
        }
    }
}

fn encode<C: Contract>(raw: &str) -> Result<Value, NormalizeError> {
    let output = normalize::<C>(raw)?;
    serde_json::to_value(&output).map_err(|e| NormalizeError::Decode {
        contract: C::NAME,
        reason: e.to_string(),
    })
}
