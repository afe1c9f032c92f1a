//! OpenAI-compatible provider.
//!
//! One struct serves both capabilities the pipeline needs from the model
//! vendor: `/embeddings` for the query vector and streaming
//! `/chat/completions` for the reply. Any API speaking the OpenAI wire format
//! works by pointing `base_url` at it.

use std::time::Duration;

use async_trait::async_trait;
use profrag_core::config::OpenAiConfig;
use profrag_core::error::{ProfRagError, Result};
use profrag_core::traits::{ChatCompleter, ChunkStream, Embedder};
use profrag_core::types::{EmbeddingVector, Message};
use serde_json::{Value, json};

use crate::sse;

pub struct OpenAiCompatibleProvider {
    /// Provider name used in logs and errors.
    name: String,
    api_key: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    base_url: String,
    embedding_model: String,
    chat_model: String,
    temperature: Option<f32>,
    /// Whole-request timeout for non-streaming calls.
    request_timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .build()
            .map_err(|e| ProfRagError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: "openai".to_string(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
            temperature: config.temperature,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            client,
        })
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Start a POST with bearer auth, failing early when no key is set.
    fn post(&self, path: &str) -> Result<reqwest::RequestBuilder> {
        if self.api_key.is_empty() {
            return Err(ProfRagError::ApiKeyMissing(self.name.clone()));
        }
        let url = format!("{}{}", self.base_url, path);
        Ok(self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key)))
    }

    /// Send a request and turn transport failures and non-2xx statuses into
    /// upstream errors.
    async fn send(&self, req: reqwest::RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| ProfRagError::upstream(&self.name, format!("{what} request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProfRagError::upstream(
                &self.name,
                format!("{what} API error {status}: {text}"),
            ));
        }
        Ok(resp)
    }

    fn chat_body(&self, messages: &[Message]) -> Value {
        let mut body = json!({
            "model": self.chat_model,
            "messages": messages,
            "stream": true,
        });
        if let Some(t) = self.temperature {
            body["temperature"] = json!(t);
        }
        body
    }
}

#[async_trait]
impl Embedder for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        let body = json!({
            "model": self.embedding_model,
            "input": text,
            "encoding_format": "float",
        });
        let req = self.post("/embeddings")?.timeout(self.request_timeout).json(&body);
        let resp = self.send(req, "Embedding").await?;

        let json: Value = resp
            .json()
            .await
            .map_err(|e| ProfRagError::upstream(&self.name, format!("Failed to parse embedding response: {e}")))?;

        let vector = parse_embedding(&json)
            .ok_or_else(|| ProfRagError::upstream(&self.name, "Invalid embedding response format"))?;

        tracing::debug!("Embedded {} chars into {} dims", text.len(), vector.len());
        Ok(vector)
    }
}

#[async_trait]
impl ChatCompleter for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, messages: &[Message]) -> Result<ChunkStream> {
        let body = self.chat_body(messages);
        let req = self
            .post("/chat/completions")?
            .header("Accept", "text/event-stream")
            .json(&body);
        let resp = self.send(req, "Chat").await?;

        tracing::debug!(
            "Chat stream opened (model={}, messages={})",
            self.chat_model,
            messages.len()
        );
        Ok(sse::delta_stream(resp.bytes_stream(), self.name.clone()))
    }
}

/// Pull `data[0].embedding` out of an embeddings response.
fn parse_embedding(json: &Value) -> Option<EmbeddingVector> {
    let values = json["data"].get(0)?["embedding"].as_array()?;
    let vector: Option<Vec<f32>> = values.iter().map(|v| v.as_f64().map(|f| f as f32)).collect();
    vector.filter(|v| !v.is_empty())
}
