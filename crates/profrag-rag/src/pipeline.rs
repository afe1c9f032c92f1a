//! Request pipeline: retrieve, augment, complete.

use std::sync::Arc;

use profrag_core::error::{ProfRagError, Result};
use profrag_core::traits::{ChatCompleter, ChunkStream, Embedder, VectorIndex};
use profrag_core::types::{Conversation, Message, RetrievedRecord, TOP_K};

use crate::context;

/// Stateless per-request orchestration over the three upstream capabilities.
/// Cheap to clone; every request may share one instance.
#[derive(Clone)]
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatCompleter>,
    system_prompt: Arc<str>,
    namespace: Arc<str>,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatCompleter>,
        system_prompt: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            index,
            chat,
            system_prompt: Arc::from(system_prompt.into()),
            namespace: Arc::from(namespace.into()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Embed `query` and fetch the closest professor records.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedRecord>> {
        let vector = self.embedder.embed(query).await?;
        let records = self.index.query(&vector, TOP_K, &self.namespace).await?;
        tracing::info!(
            "Retrieved {} professor record(s) from namespace '{}'",
            records.len(),
            self.namespace
        );
        Ok(records)
    }

    /// `[system, ..history, user: question + context]`.
    ///
    /// The received conversation is left untouched; its last turn is replaced
    /// in the returned copy and always sent with the user role.
    pub fn build_messages(
        &self,
        conversation: &Conversation,
        records: &[RetrievedRecord],
    ) -> Vec<Message> {
        let history = conversation.history();
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.system_prompt.as_ref()));
        messages.extend_from_slice(history);
        messages.push(Message::user(context::augment(
            &conversation.last().content,
            records,
        )));
        messages
    }

    /// Everything up to, but not including, the completion call.
    pub async fn prepare(&self, conversation: &Conversation) -> Result<Vec<Message>> {
        let query = conversation.last().content.as_str();
        if query.trim().is_empty() {
            return Err(ProfRagError::malformed("last message has no content"));
        }

        let records = self.retrieve(query).await?;
        Ok(self.build_messages(conversation, &records))
    }

    /// Run the whole pipeline and open the reply stream.
    pub async fn run(&self, conversation: &Conversation) -> Result<ChunkStream> {
        let messages = self.prepare(conversation).await?;
        self.chat.complete(&messages).await
    }
}
