//! Run artifact persistence
//!
//! A run is written as `plan.json`, `insights.json`, `creatives.json` and
//! `report.md` in the output directory. Each file is replaced atomically.

use adsage_contracts::RunResult;
use adsage_utils::atomic_write::{write_file_atomic, write_json_atomic};
use adsage_utils::error::AdsageError;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

pub const PLAN_FILE: &str = "plan.json";
pub const INSIGHTS_FILE: &str = "insights.json";
pub const CREATIVES_FILE: &str = "creatives.json";
pub const REPORT_FILE: &str = "report.md";

/// Paths of the artifacts written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub plan: Utf8PathBuf,
    pub insights: Utf8PathBuf,
    pub creatives: Utf8PathBuf,
    pub report: Utf8PathBuf,
}

impl WrittenArtifacts {
    #[must_use]
    pub fn paths(&self) -> [&Utf8Path; 4] {
        [&self.plan, &self.insights, &self.creatives, &self.report]
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: Utf8PathBuf,
}

impl ArtifactWriter {
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Write every artifact of `result`.
    ///
    /// # Errors
    ///
    /// Returns `AdsageError::ArtifactWriteFailed` naming the first file that
    /// could not be written.
    pub fn write(&self, result: &RunResult) -> Result<WrittenArtifacts, AdsageError> {
        let written = WrittenArtifacts {
            plan: self.dir.join(PLAN_FILE),
            insights: self.dir.join(INSIGHTS_FILE),
            creatives: self.dir.join(CREATIVES_FILE),
            report: self.dir.join(REPORT_FILE),
        };

        write_json_atomic(&written.plan, &result.plan).map_err(|e| failed(&written.plan, &e))?;
        write_json_atomic(&written.insights, &result.insights)
            .map_err(|e| failed(&written.insights, &e))?;
        write_json_atomic(&written.creatives, &result.creatives)
            .map_err(|e| failed(&written.creatives, &e))?;
        write_file_atomic(&written.report, &result.report)
            .map_err(|e| failed(&written.report, &e))?;

        debug!(dir = %self.dir, "Run artifacts written");
        Ok(written)
    }
}

fn failed(path: &Utf8Path, err: &anyhow::Error) -> AdsageError {
    AdsageError::ArtifactWriteFailed {
        path: path.to_string(),
        reason: format!("{err:#}"),
    }
}
