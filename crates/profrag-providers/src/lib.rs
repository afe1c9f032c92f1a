//! # ProfRAG Providers
//!
//! Upstream clients behind the `profrag_core` capability traits.
//!
//! The OpenAI-compatible provider serves both embeddings and streaming chat
//! completions; Pinecone serves similarity search.

pub mod openai_compatible;
pub mod pinecone;
pub mod sse;

use std::sync::Arc;

use profrag_core::config::ProfRagConfig;
use profrag_core::error::Result;
use profrag_core::traits::{ChatCompleter, Embedder, VectorIndex};

pub use openai_compatible::OpenAiCompatibleProvider;
pub use pinecone::PineconeIndex;

/// The three upstream capabilities a request needs.
#[derive(Clone)]
pub struct Providers {
    pub embedder: Arc<dyn Embedder>,
    pub index: Arc<dyn VectorIndex>,
    pub chat: Arc<dyn ChatCompleter>,
}

/// Create all providers from configuration.
///
/// Clients are built once and shared by every request; missing credentials
/// only surface when a request actually calls the provider.
pub fn create_providers(config: &ProfRagConfig) -> Result<Providers> {
    let openai = Arc::new(OpenAiCompatibleProvider::from_config(&config.openai)?);
    let index = Arc::new(PineconeIndex::from_config(&config.pinecone)?);

    tracing::debug!(
        "Providers ready: embedder={}, chat={}, index={}",
        openai.embedding_model(),
        openai.chat_model(),
        index.name()
    );

    Ok(Providers {
        embedder: openai.clone(),
        index,
        chat: openai,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_providers_from_defaults() {
        let providers = create_providers(&ProfRagConfig::default()).unwrap();
        assert_eq!(providers.embedder.name(), "openai");
        assert_eq!(providers.chat.name(), "openai");
        assert_eq!(providers.index.name(), "pinecone");
    }
}
