//! adsage - agentic analyst for Facebook Ads performance data
//!
//! adsage turns a question about an ads export into a plan, validated
//! hypotheses, creative recommendations and a markdown report. Every
//! generation call is normalized into a strict contract or replaced by a
//! deterministic fallback, so a run always ends with a well-formed
//! [`RunResult`].
//!
//! adsage can be used in two ways:
//! - **CLI**: `adsage analyze "Why did ROAS drop?" --data ads.csv`
//! - **Library**: build a [`Pipeline`] from a [`Config`] and a
//!   [`GenerationBackend`], then run it against a loaded [`Dataset`]
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use adsage::{CliArgs, Config, DataLoader, Pipeline, select_backend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(Config::discover(&CliArgs::default())?);
//! let dataset = DataLoader::new(config.data.required_columns.iter().cloned())
//!     .load("ads.csv".as_ref())?;
//! let backend = select_backend(&config)?;
//!
//! let result = Pipeline::new(config, backend)
//!     .run("Why did ROAS drop last week?", Arc::new(dataset))
//!     .await?;
//! println!("{}", result.report);
//! # Ok(())
//! # }
//! ```
//!
//! # Exit Codes
//!
//! See [`ExitCode`]. A run that degraded to fallbacks still exits with
//! `SUCCESS`; missing critical columns exit with `MISSING_DATA`.

pub mod artifacts;
pub mod cli;

pub use adsage_config::{AgentSettings, CliArgs, Config, ProviderKind, Thresholds};
pub use adsage_contracts::{
    CampaignRecommendation, CreativeIdea, CreativeSet, Evaluation, Hypothesis, HypothesisSet,
    Plan, RunResult, Stage, Task, ValidatedHypothesis, Validation,
};
pub use adsage_data::{DataLoader, DataSummary, Dataset};
pub use adsage_engine::{
    FallbackReason, Pipeline, StageAdapter, StageOutcome, aggregate_confidence, invoke,
    needs_retry, render_report,
};
pub use adsage_llm::{GenerationBackend, OfflineBackend, select_backend};
pub use adsage_normalize::{ContractKind, NormalizeError, normalize};
pub use adsage_utils::error::{
    AdsageError, ConfigError, DataError, GenerationError, UserFriendlyError,
};
pub use adsage_utils::exit_codes::ExitCode;
pub use artifacts::{ArtifactWriter, WrittenArtifacts};
