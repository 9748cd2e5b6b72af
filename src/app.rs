use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    error::{InternalError, JsonPayloadError},
    get, post,
    web::{self},
    HttpRequest, HttpResponse,
};
use tracing::{error, info};

use crate::embeddings::EmbeddingProvider;
use crate::error::VisualizeError;
use crate::model::{
    ErrorDetail, HealthResponse, MessageResponse, VisualizeRequest, VisualizeResponse,
};
use crate::pipeline;

pub struct AppState {
    pub provider: Arc<dyn EmbeddingProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }
}

#[post("/getEmbeddings")]
async fn get_embeddings(
    app: web::Data<AppState>,
    form: web::Json<VisualizeRequest>,
) -> Result<HttpResponse, VisualizeError> {
    let sentences = form.into_inner().text;

    let viz = pipeline::visualize(app.provider.as_ref(), sentences)
        .await
        .map_err(|err| {
            if !matches!(err, VisualizeError::InsufficientSentences) {
                error!(error = %err, "visualization failed");
            }
            err
        })?;

    Ok(HttpResponse::Ok().json(VisualizeResponse::from(viz)))
}

/// Kept for clients of the earlier prototype; there is nothing to delete.
#[post("/deleteContents")]
async fn delete_contents() -> HttpResponse {
    info!("delete contents requested");
    HttpResponse::Ok().json(MessageResponse {
        message: "Contents deleted",
    })
}

#[get("/health")]
async fn health(app: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        provider: app.provider.name(),
    })
}

/// Malformed bodies answer 422 and oversized ones 413, with the parser's
/// message as `detail`.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorDetail {
        detail: err.to_string(),
    };
    let mut response = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            HttpResponse::PayloadTooLarge()
        }
        _ => HttpResponse::UnprocessableEntity(),
    };
    InternalError::from_response(err, response.json(body)).into()
}

/// Route table, shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(get_embeddings)
        .service(delete_contents)
        .service(health);
}

/// Browser access limited to the configured front-end origins.
pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
