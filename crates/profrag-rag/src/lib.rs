//! # ProfRAG RAG
//!
//! Turns a received conversation into a grounded completion stream.
//!
//! ## How it works
//! ```text
//! [..history, user: "Who teaches a great intro algorithms course?"]
//!   ↓ Embedder::embed(last message)
//! query vector
//!   ↓ VectorIndex::query(top_k = 3, namespace)
//! up to 3 professor records
//!   ↓ context::format_context
//! question + "Returned results from vector db ..." block
//!   ↓ ChatCompleter::complete([system, ..history, user: augmented])
//! reply fragments
//! ```

pub mod context;
pub mod pipeline;

pub use context::{CONTEXT_HEADER, augment, format_context};
pub use pipeline::RagPipeline;
