//! # ProfRAG Core
//!
//! Shared vocabulary for the ProfRAG workspace: domain types, the provider
//! capability traits, configuration and the error type.

pub mod config;
pub mod error;
pub mod prompt;
pub mod traits;
pub mod types;

pub use config::ProfRagConfig;
pub use error::{ProfRagError, Result};
pub use traits::{ChatCompleter, ChunkStream, Embedder, VectorIndex};
pub use types::{Conversation, EmbeddingVector, Message, RetrievedRecord, Role, TOP_K};
