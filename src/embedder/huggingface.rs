//! Hugging Face hosted feature-extraction embedding client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;

use super::Embedder;

/// Default sentence-embedding model.
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Default inference router base URL.
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";

/// Blocking embeddings client for the Hugging Face inference API.
#[derive(Clone)]
pub struct HuggingFaceEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    batch_size: usize,
}

impl HuggingFaceEmbedder {
    /// Builds a new client.
    ///
    /// # Arguments
    /// * `token` - Hugging Face access token (usually `HF_TOKEN`)
    /// * `base_url` - Inference base URL; the model id and pipeline path are appended
    /// * `model` - Model repository id, e.g. `sentence-transformers/all-MiniLM-L6-v2`
    pub fn new(
        token: String,
        base_url: String,
        model: String,
        timeout: Duration,
        batch_size: usize,
    ) -> Result<Self> {
        anyhow::ensure!(!token.trim().is_empty(), "missing Hugging Face token");
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        anyhow::ensure!(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            "embedding base url must be an http(s) URL"
        );
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", token.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid Hugging Face token")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Hugging Face HTTP client")?;
        let endpoint = format!(
            "{}/{}/pipeline/feature-extraction",
            base_url.trim_end_matches('/'),
            model.trim()
        );
        Ok(Self {
            client,
            endpoint,
            model,
            batch_size: batch_size.max(1),
        })
    }

    /// Fully resolved feature-extraction endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Embedder for HuggingFaceEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        anyhow::ensure!(
            inputs.len() <= self.batch_size,
            "batch of {} exceeds configured max {}",
            inputs.len(),
            self.batch_size
        );
        debug!(model = %self.model, inputs = inputs.len(), "requesting embeddings");
        let request = FeatureExtractionRequest {
            inputs,
            options: RequestOptions {
                wait_for_model: true,
            },
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .context("failed to call Hugging Face feature extraction")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("Hugging Face embeddings request failed ({}): {}", status, body);
        }
        let embeddings: Vec<Vec<f32>> = resp
            .json()
            .context("failed to parse Hugging Face embedding response")?;
        anyhow::ensure!(
            embeddings.len() == inputs.len(),
            "Hugging Face returned {} embeddings for {} inputs",
            embeddings.len(),
            inputs.len()
        );
        Ok(embeddings)
    }
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [&'a str],
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_pipeline_endpoint_from_model() {
        let embedder = HuggingFaceEmbedder::new(
            "hf_test".into(),
            "https://router.huggingface.co/hf-inference/models/".into(),
            DEFAULT_MODEL.into(),
            Duration::from_secs(5),
            16,
        )
        .unwrap();
        assert_eq!(
            embedder.endpoint(),
            "https://router.huggingface.co/hf-inference/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction"
        );
        assert_eq!(embedder.model(), DEFAULT_MODEL);
    }

    #[test]
    fn rejects_blank_token() {
        let result = HuggingFaceEmbedder::new(
            "  ".into(),
            DEFAULT_BASE_URL.into(),
            DEFAULT_MODEL.into(),
            Duration::from_secs(5),
            16,
        );
        assert!(result.is_err());
    }
}
