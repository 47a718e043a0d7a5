use async_trait::async_trait;
use tracing::debug;

use crate::GenerationError;
use crate::types::{GenerationBackend, GenerationRequest, GenerationResponse};

/// Backend for runs without any provider. Every call fails, so every stage
/// takes its deterministic fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

#[async_trait]
impl GenerationBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        debug!(stage = %request.stage, "Offline mode, skipping generation");
        Err(GenerationError::Unsupported(
            "generation is disabled in offline mode".to_string(),
        ))
    }
}
