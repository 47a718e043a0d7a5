//! Deterministic backend for tests.

use adsage_contracts::Stage;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::GenerationError;
use crate::types::{GenerationBackend, GenerationRequest, GenerationResponse};

type Reply = Result<String, GenerationError>;

/// Replays queued replies per stage and records every request.
///
/// A stage with an empty queue fails with `Unsupported`, which stages treat
/// like any other generation failure.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<HashMap<Stage, VecDeque<Reply>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for `stage`.
    #[must_use]
    pub fn reply(self, stage: Stage, content: impl Into<String>) -> Self {
        self.push(stage, Ok(content.into()));
        self
    }

    /// Queue a failure for `stage`.
    #[must_use]
    pub fn fail(self, stage: Stage, error: GenerationError) -> Self {
        self.push(stage, Err(error));
        self
    }

    fn push(&self, stage: Stage, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.entry(stage).or_default().push_back(reply);
        }
    }

    /// Number of calls made for `stage`.
    #[must_use]
    pub fn calls(&self, stage: Stage) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.iter().filter(|r| r.stage == stage).count())
            .unwrap_or_default()
    }

    /// Every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let stage = request.stage;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.get_mut(&stage).and_then(VecDeque::pop_front));

        match reply {
            Some(Ok(content)) => Ok(GenerationResponse::new(content, "scripted", "scripted-model")),
            Some(Err(error)) => Err(error),
            None => Err(GenerationError::Unsupported(format!(
                "no scripted reply left for {stage}"
            ))),
        }
    }
}
