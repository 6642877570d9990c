//! Configuration loading for Alumnyx.
//! Reads alumnyx.toml from the current directory or path in ALUMNYX_CONFIG env var.
//! API keys never live in the file; they come from the environment (or `.env`).

use alumnyx_ingestion::embedding::{EmbeddingBackend, EmbeddingConfig};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { path: default_data_path() }
    }
}

fn default_data_path() -> String { "sample_data/bitcom_linkedin_alumni.json".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_backend")]
    pub backend: EmbeddingBackend,
    #[serde(default = "default_embed_model")]
    pub model: String,
    #[serde(default = "default_embed_dim")]
    pub dim: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    pub base_url: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: default_embed_model(),
            dim: default_embed_dim(),
            batch_size: default_batch_size(),
            base_url: None,
        }
    }
}

fn default_backend()     -> EmbeddingBackend { EmbeddingBackend::OpenAi }
fn default_embed_model() -> String { "text-embedding-3-large".to_string() }
fn default_embed_dim()   -> usize  { 3072 }
fn default_batch_size()  -> usize  { 50 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Pinecone data-plane host. Overridden by PINECONE_INDEX_HOST.
    pub host: Option<String>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { host: None, namespace: default_namespace() }
    }
}

fn default_namespace() -> String { "linkedin_profiles".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_affiliation")]
    pub affiliation: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self { affiliation: default_affiliation() }
    }
}

fn default_affiliation() -> String { "BITSoM MBA".to_string() }

/// API keys read from the environment.
#[derive(Debug, Default)]
pub struct Secrets {
    pub openai_api_key: Option<SecretString>,
    pub pinecone_api_key: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env_secret("OPENAI_API_KEY"),
            pinecone_api_key: env_secret("PINECONE_API_KEY"),
        }
    }
}

fn env_secret(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}


impl Config {
    /// Load configuration from alumnyx.toml.
    /// Checks ALUMNYX_CONFIG env var first, then current directory.
    /// A missing default file yields the built-in defaults; a missing file
    /// named explicitly by ALUMNYX_CONFIG is an error.
    pub fn load() -> anyhow::Result<Self> {
        let (path, explicit) = match std::env::var("ALUMNYX_CONFIG") {
            Ok(p) => (p, true),
            Err(_) => ("alumnyx.toml".to_string(), false),
        };

        if !Path::new(&path).exists() {
            if explicit {
                anyhow::bail!("Config file not found: {}", path);
            }
            tracing::info!("No {} found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path, e))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Index host from PINECONE_INDEX_HOST, falling back to the file.
    pub fn index_host(&self) -> Option<String> {
        std::env::var("PINECONE_INDEX_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .or_else(|| self.index.host.clone())
    }

    pub fn embedding_config(&self, api_key: Option<SecretString>) -> EmbeddingConfig {
        EmbeddingConfig {
            backend:    self.embedding.backend,
            api_key,
            model:      self.embedding.model.clone(),
            dim:        self.embedding.dim,
            base_url:   self.embedding.base_url.clone(),
        }
    }
}
