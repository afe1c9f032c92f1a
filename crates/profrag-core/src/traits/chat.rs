//! Streaming chat completion capability.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;
use crate::types::Message;

/// Lazy, forward-only sequence of reply fragments. An `Err` item is terminal.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[async_trait]
pub trait ChatCompleter: Send + Sync {
    fn name(&self) -> &str;

    /// Open a streaming completion over `messages`.
    ///
    /// Fails up front when the call cannot be established. Once the stream is
    /// returned, upstream faults arrive as an `Err` item on the stream.
    async fn complete(&self, messages: &[Message]) -> Result<ChunkStream>;
}
