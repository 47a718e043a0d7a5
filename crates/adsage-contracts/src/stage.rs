use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// Steps of a pipeline run, in execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Plan,
    Summarize,
    Hypothesize,
    Evaluate,
    Reflect,
    Recommend,
    Report,
}
