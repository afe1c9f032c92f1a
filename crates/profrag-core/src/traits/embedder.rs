//! Embedding capability.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::EmbeddingVector;

/// Turns text into a vector for similarity search.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Provider name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Embed one non-empty text. Exactly one outbound call, no retry.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector>;
}
