use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::AlumnyxError;

/// An HTTP client that only allows requests to approved domains.
/// Every outbound call of the ingestion pipeline (embeddings, vector upserts)
/// goes through this type.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist of embedding
    /// and vector index providers.
    pub fn new() -> Result<Self, AlumnyxError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AlumnyxError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "api.openai.com", // OpenAI embeddings
            "pinecone.io",    // Pinecone index hosts (*.svc.*.pinecone.io)
            "localhost",      // Ollama / local compat servers
            "127.0.0.1",      // Localhost alt
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("Alumnyx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AlumnyxError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Allows the host of `url`, e.g. a configured embedding base URL.
    pub fn allow_url_host(&mut self, url: &str) -> Result<(), AlumnyxError> {
        let parsed = Url::parse(url)
            .map_err(|e| AlumnyxError::Config(format!("invalid URL {url}: {e}")))?;
        let host = parsed.host_str()
            .ok_or_else(|| AlumnyxError::Config(format!("URL has no host: {url}")))?;
        tracing::debug!(host, "Allowlisting host");
        self.allow_domain(host);
        Ok(())
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<(), AlumnyxError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(AlumnyxError::SecurityError(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )))
        }
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, AlumnyxError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }
}
