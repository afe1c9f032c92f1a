//! Pinecone vector index client.
//!
//! Queries go to the index's data-plane host. When no host is configured it is
//! looked up once from the control plane (`GET /indexes/{name}`) and cached
//! for the life of the process.

use std::time::Duration;

use async_trait::async_trait;
use profrag_core::config::PineconeConfig;
use profrag_core::error::{ProfRagError, Result};
use profrag_core::traits::VectorIndex;
use profrag_core::types::RetrievedRecord;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;

const SERVICE: &str = "pinecone";

pub struct PineconeIndex {
    api_key: String,
    index_name: String,
    control_plane_url: String,
    api_version: String,
    request_timeout: Duration,
    /// Data-plane base URL, with scheme.
    host: OnceCell<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RetrievedRecord>,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

impl PineconeIndex {
    pub fn from_config(config: &PineconeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ProfRagError::Config(format!("Failed to build HTTP client: {e}")))?;

        let host = if config.index_host.trim().is_empty() {
            OnceCell::new()
        } else {
            OnceCell::new_with(Some(normalize_host(&config.index_host)))
        };

        Ok(Self {
            api_key: config.api_key.clone(),
            index_name: config.index_name.clone(),
            control_plane_url: config.control_plane_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            host,
            client,
        })
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.api_version)
            .timeout(self.request_timeout)
    }

    /// Resolve the data-plane host, asking the control plane on first use.
    async fn host(&self) -> Result<&str> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let url = format!("{}/indexes/{}", self.control_plane_url, self.index_name);
                let resp = self
                    .authed(self.client.get(&url))
                    .send()
                    .await
                    .map_err(|e| ProfRagError::upstream(SERVICE, format!("describe index failed: {e}")))?;

                if !resp.status().is_success() {
                    let status = resp.status();
                    let text = resp.text().await.unwrap_or_default();
                    return Err(ProfRagError::upstream(
                        SERVICE,
                        format!("describe index '{}' error {status}: {text}", self.index_name),
                    ));
                }

                let described: DescribeIndexResponse = resp
                    .json()
                    .await
                    .map_err(|e| ProfRagError::upstream(SERVICE, format!("invalid describe response: {e}")))?;
                let host = normalize_host(&described.host);
                tracing::info!("Resolved Pinecone index '{}' to {}", self.index_name, host);
                Ok::<String, ProfRagError>(host)
            })
            .await?;
        Ok(host.as_str())
    }
}

/// Hosts from the control plane come without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> Result<Vec<RetrievedRecord>> {
        if self.api_key.is_empty() {
            return Err(ProfRagError::ApiKeyMissing(SERVICE.to_string()));
        }

        let url = format!("{}/query", self.host().await?);
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "namespace": namespace,
            "includeMetadata": true,
            "includeValues": false,
        });

        let resp = self
            .authed(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProfRagError::upstream(SERVICE, format!("query failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProfRagError::upstream(SERVICE, format!("query error {status}: {text}")));
        }

        let parsed: QueryResponse = resp
            .json()
            .await
            .map_err(|e| ProfRagError::upstream(SERVICE, format!("invalid query response: {e}")))?;

        let mut matches = parsed.matches;
        matches.truncate(top_k);
        tracing::debug!("Pinecone returned {} match(es) from '{}'", matches.len(), namespace);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    };
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Seen {
        queries: Vec<Value>,
        api_keys: Vec<String>,
        describes: usize,
    }

    type Shared = Arc<Mutex<Seen>>;

    async fn spawn_fake(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn fake_query(
        State(seen): State<Shared>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let mut seen = seen.lock().unwrap();
        seen.api_keys.push(
            headers.get("Api-Key").and_then(|v| v.to_str().ok()).unwrap_or("").to_string(),
        );
        seen.queries.push(body);
        Json(json!({
            "namespace": "ns1",
            "matches": [
                {"id": "Prof A", "score": 0.91, "metadata": {"subject": "CS101", "stars": 4.8}},
                {"id": "Prof B", "score": 0.87, "metadata": {"subject": "CS101", "stars": 4.2}},
            ]
        }))
    }

    fn index(host: &str, control_plane: &str) -> PineconeIndex {
        PineconeIndex::from_config(&PineconeConfig {
            api_key: "pc-test".into(),
            index_host: host.into(),
            control_plane_url: control_plane.into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("rag-x.svc.pinecone.io"), "https://rag-x.svc.pinecone.io");
        assert_eq!(normalize_host("http://127.0.0.1:5080/"), "http://127.0.0.1:5080");
    }

    #[test]
    fn test_query_response_tolerates_missing_metadata() {
        let parsed: QueryResponse =
            serde_json::from_value(json!({"matches": [{"id": "Prof Z", "score": 0.3}]})).unwrap();
        assert_eq!(parsed.matches.len(), 1);
        assert!(parsed.matches[0].metadata.is_empty());

        let empty: QueryResponse = serde_json::from_value(json!({"namespace": "ns1"})).unwrap();
        assert!(empty.matches.is_empty());
    }

    #[test]
    fn test_query_response_tolerates_null_metadata() {
        let parsed: QueryResponse = serde_json::from_value(json!({"matches": [
            {"id": "Prof Q", "score": 0.5, "metadata": null},
            {"id": "Prof R", "score": 0.4, "metadata": {"subject": "CS101"}},
        ]}))
        .unwrap();
        assert_eq!(parsed.matches.len(), 2);
        assert!(parsed.matches[0].metadata.is_empty());
        assert_eq!(parsed.matches[1].subject().as_deref(), Some("CS101"));
    }

    #[tokio::test]
    async fn test_query_with_configured_host() {
        let seen: Shared = Arc::default();
        let app = Router::new()
            .route("/query", post(fake_query))
            .with_state(seen.clone());
        let base = spawn_fake(app).await;

        let idx = index(&base, "http://127.0.0.1:9");
        let records = idx.query(&[0.1, 0.2], 3, "ns1").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "Prof A");
        assert_eq!(records[0].stars().as_deref(), Some("4.8"));
        assert_eq!(records[1].id, "Prof B");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.queries[0]["topK"], 3);
        assert_eq!(seen.queries[0]["namespace"], "ns1");
        assert_eq!(seen.queries[0]["includeMetadata"], true);
        assert_eq!(seen.api_keys[0], "pc-test");
    }

    #[tokio::test]
    async fn test_host_resolved_once_from_control_plane() {
        let seen: Shared = Arc::default();
        let data_plane = spawn_fake(
            Router::new()
                .route("/query", post(fake_query))
                .with_state(seen.clone()),
        )
        .await;

        let describe_seen = seen.clone();
        let host = data_plane.clone();
        let control_plane = spawn_fake(Router::new().route(
            "/indexes/{name}",
            get(move |Path(name): Path<String>| {
                let seen = describe_seen.clone();
                let host = host.clone();
                async move {
                    seen.lock().unwrap().describes += 1;
                    Json(json!({"name": name, "host": host, "dimension": 1536}))
                }
            }),
        ))
        .await;

        let idx = index("", &control_plane);
        idx.query(&[0.1], 3, "ns1").await.unwrap();
        idx.query(&[0.2], 3, "ns1").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.describes, 1);
        assert_eq!(seen.queries.len(), 2);
    }

    #[tokio::test]
    async fn test_query_error_status() {
        let app = Router::new().route(
            "/query",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = spawn_fake(app).await;

        let err = index(&base, "http://127.0.0.1:9")
            .query(&[0.1], 3, "ns1")
            .await
            .unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let idx = PineconeIndex::from_config(&PineconeConfig::default()).unwrap();
        let err = idx.query(&[0.1], 3, "ns1").await.unwrap_err();
        assert!(matches!(err, ProfRagError::ApiKeyMissing(_)));
    }
}
