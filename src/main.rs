use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use embed_viz::config::{Config, ProviderKind};
use embed_viz::embeddings::{EmbeddingProvider, OpenAiEmbeddingProvider};
use embed_viz::{app, AppState};

fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match config.provider {
        ProviderKind::OpenAi => {
            let openai = config.openai()?;
            info!(model = %openai.model, base_url = %openai.base_url, "using OpenAI embeddings");
            Ok(Arc::new(OpenAiEmbeddingProvider::new(openai)?))
        }
        #[cfg(feature = "local-model")]
        ProviderKind::Local => {
            let provider = embed_viz::embeddings::LocalEmbeddingProvider::load(
                &config.local_model_path,
            )
            .context("could not load model")?;
            Ok(Arc::new(provider))
        }
        #[cfg(not(feature = "local-model"))]
        ProviderKind::Local => Err(embed_viz::ConfigError::ProviderUnavailable("local").into()),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let provider = build_provider(&config)?;
    let data = web::Data::new(AppState::new(provider));
    let origins = config.cors_origins()?;

    info!(host = %config.host, port = config.port, origins = ?origins, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(app::cors(&origins))
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(app::configure)
    })
    .bind(config.bind_addr())
    .with_context(|| format!("could not bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("server terminated")
}
