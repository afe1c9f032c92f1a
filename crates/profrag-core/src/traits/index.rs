//! Vector index capability.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RetrievedRecord;

/// Nearest-neighbour lookup against a vector database.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn name(&self) -> &str;

    /// Return at most `top_k` records from `namespace`, most similar first.
    /// Fewer records come back when the index holds fewer matches.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> Result<Vec<RetrievedRecord>>;
}
