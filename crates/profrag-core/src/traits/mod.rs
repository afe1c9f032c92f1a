//! Capability traits for the upstream services. The request pipeline only
//! talks to these, so any vendor can be swapped in without touching it.

pub mod chat;
pub mod embedder;
pub mod index;

pub use chat::{ChatCompleter, ChunkStream};
pub use embedder::Embedder;
pub use index::VectorIndex;
