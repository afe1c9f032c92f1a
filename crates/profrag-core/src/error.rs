//! ProfRAG error types.

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ProfRagError>;

/// Every failure a request or the process can hit.
#[derive(Debug, thiserror::Error)]
pub enum ProfRagError {
    /// Embedding, index or chat service failed: transport, auth, rate limit,
    /// non-2xx status or a response we could not understand.
    #[error("{service} upstream error: {message}")]
    Upstream { service: String, message: String },

    /// Request body missing, not parseable, or without a final message.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("API key missing for {0}")]
    ApiKeyMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProfRagError {
    /// Shorthand for [`ProfRagError::Upstream`].
    pub fn upstream(service: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest(message.into())
    }

    /// True for failures that happened on the far side of an upstream call.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}
