use actix_web::web;
use tracing::info;

use crate::embeddings::{fetch_embeddings, EmbeddingProvider};
use crate::error::VisualizeError;
use crate::pca;

/// Smallest batch a PCA fit can say anything about.
pub const MIN_SENTENCES: usize = 2;

/// Projected points paired index-by-index with the sentences they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Visualization {
    pub points: Vec<[f64; pca::COMPONENTS]>,
    pub sentences: Vec<String>,
}

/// Embeds `sentences` and projects the batch onto two dimensions.
///
/// Batches smaller than [`MIN_SENTENCES`] are rejected before any provider
/// call is made.
pub async fn visualize(
    provider: &dyn EmbeddingProvider,
    sentences: Vec<String>,
) -> Result<Visualization, VisualizeError> {
    if sentences.len() < MIN_SENTENCES {
        return Err(VisualizeError::InsufficientSentences);
    }

    let vectors = fetch_embeddings(provider, &sentences).await?;
    info!(
        provider = provider.name(),
        sentences = sentences.len(),
        dimension = vectors.first().map(Vec::len).unwrap_or_default(),
        "fetched embeddings"
    );

    // O(n^3) in the batch size; keep it off the request worker.
    let points = web::block(move || pca::project(&vectors)).await??;

    Ok(Visualization { points, sentences })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EmbeddingError, ReduceError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        calls: AtomicUsize,
        dims: fn(&str) -> usize,
    }

    #[async_trait]
    impl EmbeddingProvider for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn embed(&self, sentence: &str) -> Result<Vec<f32>, EmbeddingError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..(self.dims)(sentence)).map(|i| (i * (n + 1)) as f32).collect())
        }
    }

    fn provider(dims: fn(&str) -> usize) -> Fixed {
        Fixed {
            calls: AtomicUsize::new(0),
            dims,
        }
    }

    #[actix_web::test]
    async fn pairs_points_with_original_sentences() {
        let p = provider(|_| 4);
        let input = vec![
            "cat sat on mat".to_owned(),
            "dog ran in park".to_owned(),
            "bird flew away".to_owned(),
        ];

        let viz = visualize(&p, input.clone()).await.unwrap();

        assert_eq!(viz.sentences, input);
        assert_eq!(viz.points.len(), input.len());
        assert_eq!(p.calls.load(Ordering::SeqCst), 3);
    }

    #[actix_web::test]
    async fn short_batches_never_reach_the_provider() {
        let p = provider(|_| 4);

        for input in [vec![], vec!["only one".to_owned()]] {
            let err = visualize(&p, input).await.unwrap_err();
            assert!(matches!(err, VisualizeError::InsufficientSentences));
        }
        assert_eq!(p.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn ragged_embeddings_fail_the_batch() {
        let p = provider(|s| s.len());

        let err = visualize(&p, vec!["ab".to_owned(), "abc".to_owned()])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VisualizeError::Reduce(ReduceError::DimensionMismatch { index: 1, .. })
        ));
    }
}
