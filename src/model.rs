use serde::{Deserialize, Serialize};

use crate::pipeline::Visualization;

#[derive(Deserialize, Serialize)]
pub struct VisualizeRequest {
    pub text: Vec<String>,
}

/// Points and sentences are index-aligned.
#[derive(Deserialize, Serialize)]
pub struct VisualizeResponse {
    pub embeddings: Vec<[f64; 2]>,
    pub sentences: Vec<String>,
}

impl From<Visualization> for VisualizeResponse {
    fn from(viz: Visualization) -> Self {
        Self {
            embeddings: viz.points,
            sentences: viz.sentences,
        }
    }
}

#[derive(Deserialize, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: &'static str,
}
