//! # ProfRAG Gateway
//!
//! HTTP surface of the service. `POST /api/chat` takes a JSON conversation and
//! answers with the model's reply as a chunked `text/plain` body, relayed
//! fragment by fragment as the upstream produces it.

pub mod relay;
pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
