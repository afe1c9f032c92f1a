//! ProfRAG configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ProfRagError, Result};
use crate::prompt::DEFAULT_SYSTEM_PROMPT;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfRagConfig {
    /// System instruction prepended to every completion.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub pinecone: PineconeConfig,
}

fn default_system_prompt() -> String { DEFAULT_SYSTEM_PROMPT.into() }

impl Default for ProfRagConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            gateway: GatewayConfig::default(),
            openai: OpenAiConfig::default(),
            pinecone: PineconeConfig::default(),
        }
    }
}

impl ProfRagConfig {
    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ProfRagError::Config(format!("Failed to parse config: {e}")))
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the ProfRAG home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".profrag")
    }

    /// Fill blank credentials and endpoints from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Fill blank fields from `lookup`. File values always win.
    ///
    /// Recognised keys: `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// `PINECONE_API_KEY`, `PINECONE_INDEX_HOST`.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.openai.api_key.is_empty() {
            if let Some(key) = non_empty("OPENAI_API_KEY") {
                self.openai.api_key = key;
            }
        }
        if self.openai.base_url == default_openai_base_url() {
            if let Some(url) = non_empty("OPENAI_BASE_URL") {
                self.openai.base_url = url;
            }
        }
        if self.pinecone.api_key.is_empty() {
            if let Some(key) = non_empty("PINECONE_API_KEY") {
                self.pinecone.api_key = key;
            }
        }
        if self.pinecone.index_host.is_empty() {
            if let Some(host) = non_empty("PINECONE_INDEX_HOST") {
                self.pinecone.index_host = host;
            }
        }
    }

    /// Reject settings that can never produce a working request.
    pub fn validate(&self) -> Result<()> {
        if self.system_prompt.trim().is_empty() {
            return Err(ProfRagError::Config("system_prompt must not be empty".into()));
        }
        if self.gateway.port == 0 {
            return Err(ProfRagError::Config("gateway.port must be non-zero".into()));
        }
        if self.openai.embedding_model.trim().is_empty() || self.openai.chat_model.trim().is_empty() {
            return Err(ProfRagError::Config("openai model names must not be empty".into()));
        }
        if self.pinecone.namespace.trim().is_empty() {
            return Err(ProfRagError::Config("pinecone.namespace must not be empty".into()));
        }
        if self.pinecone.index_host.is_empty() && self.pinecone.index_name.trim().is_empty() {
            return Err(ProfRagError::Config(
                "pinecone.index_host or pinecone.index_name is required".into(),
            ));
        }
        Ok(())
    }

    /// Copy with every secret masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.openai.api_key = mask_secret(&copy.openai.api_key);
        copy.pinecone.api_key = mask_secret(&copy.pinecone.api_key);
        copy
    }
}

/// Mask a secret string for display: show first 4 chars + ••••
pub fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    match s.char_indices().nth(4) {
        Some((idx, _)) => format!("{}••••", &s[..idx]),
        None => "••••".to_string(),
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Embedding and chat provider (OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for the embedding call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Longest silence allowed between two reads. Bounds a stalled reply
    /// stream without capping its total length.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

fn default_openai_base_url() -> String { "https://api.openai.com/v1".into() }
fn default_embedding_model() -> String { "text-embedding-3-small".into() }
fn default_chat_model() -> String { "gpt-4o-mini".into() }
fn default_connect_timeout() -> u64 { 10 }
fn default_request_timeout() -> u64 { 30 }
fn default_read_timeout() -> u64 { 60 }

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            temperature: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

/// Vector database (Pinecone) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// Data-plane host. Looked up from the control plane when empty.
    #[serde(default)]
    pub index_host: String,
    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_pinecone_api_version")]
    pub api_version: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_index_name() -> String { "rag".into() }
fn default_control_plane_url() -> String { "https://api.pinecone.io".into() }
fn default_namespace() -> String { "ns1".into() }
fn default_pinecone_api_version() -> String { "2024-07".into() }

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_name: default_index_name(),
            index_host: String::new(),
            control_plane_url: default_control_plane_url(),
            namespace: default_namespace(),
            api_version: default_pinecone_api_version(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}
