//! Sentence embedding visualiser.
//!
//! Fetches one embedding per sentence from a provider, fits a
//! two-component PCA over the batch and serves the projected points
//! over HTTP.

pub mod app;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod model;
pub mod pca;
pub mod pipeline;

pub use app::AppState;
pub use config::Config;
pub use embeddings::EmbeddingProvider;
pub use error::{ConfigError, EmbeddingError, ReduceError, VisualizeError};
pub use pipeline::{visualize, Visualization};
