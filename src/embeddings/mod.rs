//! Embedding Fetcher: one vector per sentence, in input order.

use async_trait::async_trait;
use tracing::debug;

use crate::error::EmbeddingError;

#[cfg(feature = "local-model")]
pub mod local;
pub mod openai;

#[cfg(feature = "local-model")]
pub use local::LocalEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;

/// Source of sentence embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short name used in logs and `/health`.
    fn name(&self) -> &'static str;

    async fn embed(&self, sentence: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Embeds every sentence with one provider call each, sequentially.
///
/// The first failing call aborts the whole batch; no partial result is
/// returned.
pub async fn fetch_embeddings(
    provider: &dyn EmbeddingProvider,
    sentences: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut vectors = Vec::with_capacity(sentences.len());
    for (index, sentence) in sentences.iter().enumerate() {
        debug!(provider = provider.name(), index, "embedding sentence");
        vectors.push(provider.embed(sentence).await?);
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Encodes each sentence as its length and remembers what it was asked.
    struct Recording {
        seen: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl EmbeddingProvider for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn embed(&self, sentence: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.seen.lock().unwrap().push(sentence.to_owned());
            if self.fail_on == Some(sentence) {
                return Err(EmbeddingError::EmptyResponse);
            }
            Ok(vec![sentence.len() as f32, 1.0])
        }
    }

    #[actix_web::test]
    async fn preserves_input_order() {
        let provider = Recording {
            seen: Mutex::new(Vec::new()),
            fail_on: None,
        };
        let sentences = vec!["ccc".to_owned(), "a".to_owned(), "bb".to_owned()];

        let vectors = fetch_embeddings(&provider, &sentences).await.unwrap();

        assert_eq!(vectors, vec![vec![3.0, 1.0], vec![1.0, 1.0], vec![2.0, 1.0]]);
        assert_eq!(*provider.seen.lock().unwrap(), sentences);
    }

    #[actix_web::test]
    async fn stops_at_first_failure() {
        let provider = Recording {
            seen: Mutex::new(Vec::new()),
            fail_on: Some("two"),
        };
        let sentences = vec!["one".to_owned(), "two".to_owned(), "three".to_owned()];

        let err = fetch_embeddings(&provider, &sentences).await.unwrap_err();

        assert!(matches!(err, EmbeddingError::EmptyResponse));
        assert_eq!(*provider.seen.lock().unwrap(), vec!["one", "two"]);
    }
}
