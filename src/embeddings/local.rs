use std::path::Path;
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use rust_bert::pipelines::sentence_embeddings::{
    SentenceEmbeddingsBuilder, SentenceEmbeddingsModel,
};
use tracing::info;

use super::EmbeddingProvider;
use crate::error::EmbeddingError;

/// Sentence-transformer running in-process.
pub struct LocalEmbeddingProvider {
    model: Arc<Mutex<SentenceEmbeddingsModel>>,
}

impl LocalEmbeddingProvider {
    pub fn load(path: &Path) -> Result<Self, EmbeddingError> {
        info!(path = %path.display(), "loading local sentence embedding model");
        let model = SentenceEmbeddingsBuilder::local(path)
            .create_model()
            .map_err(|e| EmbeddingError::Model(e.to_string()))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn embed(&self, sentence: &str) -> Result<Vec<f32>, EmbeddingError> {
        let model = Arc::clone(&self.model);
        let input = [sentence.to_owned()];

        let encoded = web::block(move || {
            let model = model
                .lock()
                .map_err(|_| EmbeddingError::Model("model lock poisoned".to_owned()))?;
            model
                .encode(&input)
                .map_err(|e| EmbeddingError::Model(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::Model(e.to_string()))??;

        encoded
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse)
    }
}
