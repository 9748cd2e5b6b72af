//! OpenAI embedding provider.
//!
//! Talks to the `/embeddings` endpoint of OpenAI or any API that speaks
//! the same protocol. One request per sentence.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::EmbeddingProvider;
use crate::config::OpenAiConfig;
use crate::error::{ConfigError, EmbeddingError};

pub struct OpenAiEmbeddingProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn embed(&self, sentence: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/embeddings", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingsRequest {
                model: &self.config.model,
                input: sentence,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_owned());
            warn!(%status, "embedding API rejected request");
            return Err(EmbeddingError::Status { status, body });
        }

        let result: EmbeddingsResponse = response.json().await?;
        result
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::EmptyResponse)
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}
