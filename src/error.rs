use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::model::ErrorDetail;

/// Startup configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("OpenAI API key not set. Set OPENAI_API_KEY or pass --openai-api-key")]
    MissingApiKey,

    #[error("provider '{0}' is not available in this build (enable the `local-model` feature)")]
    ProviderUnavailable(&'static str),

    #[error("invalid CORS origin '{0}': expected scheme://host[:port]")]
    InvalidOrigin(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Failures while obtaining a vector for a sentence.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Embedding API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Embedding API returned no embedding")]
    EmptyResponse,

    #[error("Local embedding model failed: {0}")]
    Model(String),
}

/// Inputs the PCA fit cannot work with.
#[derive(Error, Debug, PartialEq)]
pub enum ReduceError {
    #[error("PCA needs at least 2 vectors, got {0}")]
    TooFewVectors(usize),

    #[error("embedding vectors are empty")]
    EmptyVectors,

    #[error("embedding {index} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("embedding {0} contains a non-finite value")]
    NonFinite(usize),
}

/// Outcome of a failed visualization request.
///
/// `InsufficientSentences` is the domain error callers can fix by sending
/// more input; everything else is unexpected and carries the underlying
/// message through unchanged.
#[derive(Error, Debug)]
pub enum VisualizeError {
    #[error("Need at least 2 sentences for visualization")]
    InsufficientSentences,

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Reduce(#[from] ReduceError),

    #[error("PCA worker failed: {0}")]
    Worker(#[from] actix_web::error::BlockingError),
}

impl ResponseError for VisualizeError {
    fn status_code(&self) -> StatusCode {
        match self {
            VisualizeError::InsufficientSentences => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorDetail {
            detail: self.to_string(),
        })
    }
}
