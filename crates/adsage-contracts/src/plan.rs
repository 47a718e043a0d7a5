use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{ContractViolation, check_unique_ids};

/// Columns a task needs when the generator did not say.
pub const DEFAULT_DATA_REQUIREMENTS: [&str; 3] = ["spend", "revenue", "roas"];
pub const DEFAULT_EXPECTED_OUTPUT: &str = "Analysis results";
pub const DEFAULT_TASK_DESCRIPTION: &str = "Analysis task";
pub const DEFAULT_QUERY: &str = "Analysis query";
pub const DEFAULT_INTENT: &str = "general_analysis";
pub const DEFAULT_SUCCESS_CRITERIA: &str = "Complete analysis";

/// Intents the pipeline itself produces. Generated plans may carry any string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    DiagnoseDrop,
    OptimizePerformance,
    GeneralAnalysis,
}

/// Decomposition of the user's question into analysis tasks.
///
/// A normalized plan has at least one task and every `task_id` is unique. The
/// terminal result of a failed run is the only place an empty plan appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub query: String,
    pub intent: String,
    pub tasks: Vec<Task>,
    pub success_criteria: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub description: String,
    /// Column names, unique, in first-seen order.
    pub data_requirements: Vec<String>,
    pub expected_output: String,
}

impl Plan {
    pub const CONTRACT: &'static str = "plan";

    /// Plan with no tasks, used only by the failed run result.
    #[must_use]
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            intent: String::new(),
            tasks: Vec::new(),
            success_criteria: String::new(),
        }
    }

    /// Verify the plan invariants.
    pub fn check(&self) -> Result<(), ContractViolation> {
        if self.tasks.is_empty() {
            return Err(ContractViolation::EmptyList {
                contract: Self::CONTRACT,
                key: "tasks",
            });
        }
        check_unique_ids(Self::CONTRACT, self.tasks.iter().map(|t| t.task_id.as_str()))
    }

    /// Union of all task data requirements, first-seen order.
    #[must_use]
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for column in self.tasks.iter().flat_map(|t| t.data_requirements.iter()) {
            if !columns.contains(&column.as_str()) {
                columns.push(column);
            }
        }
        columns
    }
}

impl Task {
    #[must_use]
    pub fn new(
        task_id: impl Into<String>,
        description: impl Into<String>,
        data_requirements: &[&str],
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            description: description.into(),
            data_requirements: data_requirements.iter().map(|s| (*s).to_string()).collect(),
            expected_output: expected_output.into(),
        }
    }
}
