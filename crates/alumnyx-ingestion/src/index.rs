//! Vector index clients.
//!
//! `PineconeIndex` talks to a Pinecone index data-plane host;
//! `InMemoryIndex` keeps vectors in process for dry runs and tests.

use std::collections::HashMap;

use alumnyx_common::error::AlumnyxError;
use alumnyx_common::sandbox::SandboxClient as Client;
use anyhow::Result;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::models::ProfileMetadata;

/// One vector to upsert, keyed by record id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ProfileMetadata,
}

/// Namespaced vector store with upsert semantics (same id overwrites).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert vectors into `namespace`; returns the number written.
    async fn upsert(&self, namespace: &str, vectors: &[VectorRecord]) -> Result<usize>;
}

// ── Pinecone ──────────────────────────────────────────────────────────────────

pub struct PineconeIndex {
    host:    String,
    api_key: SecretString,
    client:  Client,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors:   &'a [VectorRecord],
    namespace: &'a str,
}

impl PineconeIndex {
    /// `host` is the index data-plane host, with or without scheme,
    /// e.g. `ipcs-abc123.svc.aped-4627-b74a.pinecone.io`.
    pub fn new(host: &str, api_key: SecretString) -> Result<Self> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(AlumnyxError::Config("Pinecone index host is empty".to_string()).into());
        }
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        let mut client = Client::new()?;
        client.allow_url_host(&host)?;
        Ok(Self { host, api_key, client })
    }

    pub fn upsert_url(&self) -> String {
        format!("{}/vectors/upsert", self.host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, vectors), fields(n = vectors.len()))]
    async fn upsert(&self, namespace: &str, vectors: &[VectorRecord]) -> Result<usize> {
        if vectors.is_empty() { return Ok(0); }
        let resp: serde_json::Value = self.client
            .post(&self.upsert_url())?
            .header("Api-Key", self.api_key.expose_secret())
            .json(&UpsertRequest { vectors, namespace })
            .send().await?
            .error_for_status()?
            .json().await?;
        let count = resp["upsertedCount"].as_u64().ok_or_else(|| {
            AlumnyxError::Index(format!("upsert response missing upsertedCount: {resp}"))
        })?;
        debug!(namespace, count, "Pinecone upsert complete");
        Ok(count as usize)
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryIndex {
    namespaces: RwLock<HashMap<String, HashMap<String, VectorRecord>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct ids stored in `namespace`.
    pub async fn len(&self, namespace: &str) -> usize {
        self.namespaces.read().await.get(namespace).map_or(0, |ns| ns.len())
    }

    pub async fn get(&self, namespace: &str, id: &str) -> Option<VectorRecord> {
        self.namespaces.read().await.get(namespace).and_then(|ns| ns.get(id).cloned())
    }

    pub async fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, namespace: &str, vectors: &[VectorRecord]) -> Result<usize> {
        let mut guard = self.namespaces.write().await;
        let ns = guard.entry(namespace.to_string()).or_default();
        for v in vectors {
            ns.insert(v.id.clone(), v.clone());
        }
        Ok(vectors.len())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
