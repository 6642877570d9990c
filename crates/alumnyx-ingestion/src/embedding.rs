//! Embedding client: turns composed profile documents into vectors.
//!
//! Supports multiple backends:
//!   - OpenAI         (text-embedding-3-small / text-embedding-3-large)
//!   - OpenAI-compat  (any /v1/embeddings endpoint, e.g. Groq, Together, etc.)
//!   - Ollama         (nomic-embed-text or any ollama embedding model)
//!
//! The vector index dimension is fixed at creation time, so every returned
//! vector is checked against the configured `dim`.

use alumnyx_common::error::AlumnyxError;
use alumnyx_common::sandbox::SandboxClient as Client;
use anyhow::Result;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

// ── Backend config ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct EmbeddingConfig {
    pub backend:    EmbeddingBackend,
    pub api_key:    Option<SecretString>,
    pub model:      String,
    pub dim:        usize,
    pub base_url:   Option<String>,  // for compat/ollama
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbeddingBackend {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
    #[serde(rename = "ollama")]
    Ollama,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend:    EmbeddingBackend::OpenAi,
            api_key:    None,
            model:      "text-embedding-3-large".to_string(),
            dim:        3072,
            base_url:   None,
        }
    }
}

// ── Embedder seam ─────────────────────────────────────────────────────────────

/// Anything that can embed a batch of documents.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Vector dimension produced by this embedder.
    fn dim(&self) -> usize;

    /// Embed a batch of texts; returns one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

// ── Embedding client ──────────────────────────────────────────────────────────

pub struct EmbeddingClient {
    cfg:    EmbeddingConfig,
    client: Client,
}

impl EmbeddingClient {
    pub fn new(cfg: EmbeddingConfig) -> Result<Self> {
        let mut client = Client::new()?;
        if let Some(ref base) = cfg.base_url {
            client.allow_url_host(base)?;
        }
        Ok(Self { cfg, client })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.cfg
    }

    fn api_key(&self) -> Option<&str> {
        self.cfg.api_key.as_ref().map(|k| k.expose_secret())
    }

    // ── OpenAI ─────────────────────────────────────────────────────────────

    async fn embed_openai(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let key = self.api_key().ok_or_else(|| {
            AlumnyxError::Config("OpenAI embedding backend requires an API key".to_string())
        })?;
        let body = serde_json::json!({
            "model": &self.cfg.model,
            "input": texts,
        });
        let resp: serde_json::Value = self.client
            .post(OPENAI_EMBEDDINGS_URL)?
            .bearer_auth(key)
            .json(&body)
            .send().await?
            .error_for_status()?
            .json().await?;
        parse_openai_embeddings(&resp)
    }

    // ── OpenAI-compatible ──────────────────────────────────────────────────

    async fn embed_compat(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let base = self.cfg.base_url.as_deref()
            .unwrap_or("http://localhost:11434").trim_end_matches('/');
        let url = format!("{}/v1/embeddings", base);
        let body = serde_json::json!({
            "model": &self.cfg.model,
            "input": texts,
        });
        let mut req = self.client.post(&url)?.json(&body);
        if let Some(k) = self.api_key() {
            req = req.bearer_auth(k);
        }
        let resp: serde_json::Value = req.send().await?.error_for_status()?.json().await?;
        parse_openai_embeddings(&resp)
    }

    // ── Ollama ─────────────────────────────────────────────────────────────

    async fn embed_ollama(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let base = self.cfg.base_url.as_deref()
            .unwrap_or("http://localhost:11434").trim_end_matches('/');
        let url = format!("{}/api/embeddings", base);
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            let body = serde_json::json!({"model": &self.cfg.model, "prompt": text});
            let resp: serde_json::Value = self.client
                .post(&url)?
                .json(&body)
                .send().await?
                .error_for_status()?
                .json().await?;
            out.push(parse_vector(&resp["embedding"]));
        }
        Ok(out)
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    fn dim(&self) -> usize {
        self.cfg.dim
    }

    #[instrument(skip(self, texts), fields(n = texts.len(), backend = ?self.cfg.backend))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(vec![]); }
        let vecs = match self.cfg.backend {
            EmbeddingBackend::OpenAi           => self.embed_openai(texts).await?,
            EmbeddingBackend::OpenAiCompatible => self.embed_compat(texts).await?,
            EmbeddingBackend::Ollama           => self.embed_ollama(texts).await?,
        };
        check_shape(&vecs, texts.len(), self.cfg.dim)?;
        debug!(n = vecs.len(), "Batch embedded");
        Ok(vecs)
    }
}

/// Embedder that returns zero vectors without any network call.
/// Used for dry runs.
#[derive(Debug, Clone)]
pub struct ZeroEmbedder {
    dim: usize,
}

impl ZeroEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

#[async_trait]
impl Embedder for ZeroEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(vec![vec![0.0; self.dim]; texts.len()])
    }
}

/// Parse an OpenAI-style `{"data": [{"index": i, "embedding": [...]}]}`
/// response, ordered by `index`.
fn parse_openai_embeddings(resp: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = resp["data"].as_array().ok_or_else(|| {
        AlumnyxError::Embedding(format!("response has no data array: {}", truncate_json(resp)))
    })?;
    let mut rows: Vec<(u64, Vec<f32>)> = data
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let index = item["index"].as_u64().unwrap_or(i as u64);
            (index, parse_vector(&item["embedding"]))
        })
        .collect();
    rows.sort_by_key(|(index, _)| *index);
    Ok(rows.into_iter().map(|(_, v)| v).collect())
}

fn parse_vector(value: &serde_json::Value) -> Vec<f32> {
    value.as_array().map(|arr| {
        arr.iter().map(|v| v.as_f64().unwrap_or(0.0) as f32).collect()
    }).unwrap_or_default()
}

fn check_shape(vecs: &[Vec<f32>], expected: usize, dim: usize) -> Result<(), AlumnyxError> {
    if vecs.len() != expected {
        return Err(AlumnyxError::Embedding(format!(
            "expected {expected} vectors, got {}", vecs.len()
        )));
    }
    if let Some(bad) = vecs.iter().find(|v| v.len() != dim) {
        return Err(AlumnyxError::Embedding(format!(
            "expected dimension {dim}, got {}", bad.len()
        )));
    }
    Ok(())
}

fn truncate_json(value: &serde_json::Value) -> String {
    let s = value.to_string();
    match s.char_indices().nth(200) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_index() {
        let cfg = EmbeddingConfig::default();
        assert_eq!(cfg.backend, EmbeddingBackend::OpenAi);
        assert_eq!(cfg.model, "text-embedding-3-large");
        assert_eq!(cfg.dim, 3072);
    }

    #[test]
    fn test_parse_openai_orders_by_index() {
        let resp = serde_json::json!({
            "data": [
                {"index": 1, "embedding": [0.5, 0.5]},
                {"index": 0, "embedding": [1.0, 0.0]}
            ]
        });
        let vecs = parse_openai_embeddings(&resp).unwrap();
        assert_eq!(vecs, vec![vec![1.0, 0.0], vec![0.5, 0.5]]);
    }

    #[test]
    fn test_parse_openai_error_body() {
        let resp = serde_json::json!({"error": {"message": "bad key"}});
        assert!(parse_openai_embeddings(&resp).is_err());
    }

    #[test]
    fn test_check_shape() {
        assert!(check_shape(&[vec![0.0; 3]], 1, 3).is_ok());
        assert!(check_shape(&[vec![0.0; 3]], 2, 3).is_err());
        assert!(check_shape(&[vec![0.0; 2]], 1, 3).is_err());
    }

    #[test]
    fn test_backend_serde_names() {
        let b: EmbeddingBackend = serde_json::from_str("\"openai_compatible\"").unwrap();
        assert_eq!(b, EmbeddingBackend::OpenAiCompatible);
        assert_eq!(serde_json::to_string(&EmbeddingBackend::Ollama).unwrap(), "\"ollama\"");
    }

    #[tokio::test]
    async fn test_zero_embedder() {
        let e = ZeroEmbedder::new(4);
        let v = e.embed_batch(&["a".to_string(), "b".to_string()]).await.unwrap();
        assert_eq!(v.len(), 2);
        assert!(v.iter().all(|x| x.len() == 4 && x.iter().all(|f| *f == 0.0)));
    }

    #[tokio::test]
    async fn test_openai_without_key_fails_before_network() {
        let client = EmbeddingClient::new(EmbeddingConfig::default()).unwrap();
        let err = client.embed_batch(&["x".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let client = EmbeddingClient::new(EmbeddingConfig::default()).unwrap();
        assert!(client.embed_batch(&[]).await.unwrap().is_empty());
    }
}
