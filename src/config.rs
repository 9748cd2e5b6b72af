//! Process configuration, parsed once at startup from flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use actix_web::http::Uri;
use clap::{Parser, ValueEnum};

use crate::error::ConfigError;

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "https://visualiser.axonbuild.com",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// OpenAI-compatible `/embeddings` endpoint
    #[value(name = "openai")]
    OpenAi,
    /// Sentence-transformer model loaded from disk
    Local,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "embed-viz")]
#[command(about = "Project sentence embeddings onto 2-D coordinates for plotting")]
#[command(version)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "EMBED_VIZ_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP server port
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Where embeddings come from
    #[arg(long, env = "EMBED_VIZ_PROVIDER", value_enum, default_value_t = ProviderKind::OpenAi)]
    pub provider: ProviderKind,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// Embedding model requested from the API
    #[arg(long, env = "EMBED_VIZ_MODEL", default_value = "text-embedding-3-small")]
    pub model: String,

    /// Upper bound on a single provider call
    #[arg(long, env = "EMBED_VIZ_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Directory holding the local sentence-transformer
    #[arg(long, env = "EMBED_VIZ_LOCAL_MODEL_PATH", default_value = "./all-MiniLM-L12-v2")]
    pub local_model_path: PathBuf,

    /// Browser origins allowed by CORS
    #[arg(
        long,
        env = "EMBED_VIZ_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values_t = DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string())
    )]
    pub allowed_origins: Vec<String>,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, env = "EMBED_VIZ_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Everything the OpenAI provider needs. Built once, owned by the provider.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn openai(&self) -> Result<OpenAiConfig, ConfigError> {
        let api_key = self
            .openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(OpenAiConfig {
            api_key: api_key.to_owned(),
            base_url: self.openai_base_url.trim_end_matches('/').to_owned(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }

    /// Configured origins with blanks dropped; wildcards and anything that
    /// is not `scheme://host[:port]` are rejected.
    pub fn cors_origins(&self) -> Result<Vec<String>, ConfigError> {
        self.allowed_origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(|origin| {
                let uri: Uri = origin
                    .parse()
                    .map_err(|_| ConfigError::InvalidOrigin(origin.to_owned()))?;
                let bare = uri.path() == "/" && uri.query().is_none();
                if origin == "*" || uri.scheme().is_none() || uri.authority().is_none() || !bare {
                    return Err(ConfigError::InvalidOrigin(origin.to_owned()));
                }
                Ok(origin.trim_end_matches('/').to_owned())
            })
            .collect()
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["embed-viz"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn openai_config_from_flags() {
        let config = parse(&[
            "--openai-api-key",
            " sk-test ",
            "--openai-base-url",
            "http://localhost:9999/v1/",
            "--request-timeout-secs",
            "5",
        ]);

        let openai = config.openai().unwrap();
        assert_eq!(openai.api_key, "sk-test");
        assert_eq!(openai.base_url, "http://localhost:9999/v1");
        assert_eq!(openai.model, "text-embedding-3-small");
        assert_eq!(openai.timeout, Duration::from_secs(5));
        assert!(!format!("{openai:?}").contains("sk-test"));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let config = parse(&["--openai-api-key", "  "]);
        assert!(matches!(config.openai(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn allowed_origins_split_on_commas() {
        let config = parse(&[
            "--allowed-origins",
            "http://a.example,https://b.example",
            "--provider",
            "local",
        ]);
        assert_eq!(
            config.allowed_origins,
            vec!["http://a.example", "https://b.example"]
        );
        assert_eq!(config.provider, ProviderKind::Local);
    }

    #[test]
    fn trailing_comma_in_origins_is_ignored() {
        let config = parse(&["--allowed-origins", "http://localhost:3000, ,"]);
        assert_eq!(config.cors_origins().unwrap(), vec!["http://localhost:3000"]);
    }

    #[test]
    fn default_origins_are_valid() {
        let config = parse(&[]);
        assert_eq!(config.cors_origins().unwrap().len(), DEFAULT_ALLOWED_ORIGINS.len());
    }

    #[test]
    fn malformed_origins_are_rejected() {
        for bad in ["*", "localhost:3000", "not an origin", "https://a.example/app"] {
            let config = parse(&["--allowed-origins", bad]);
            assert!(
                matches!(config.cors_origins(), Err(ConfigError::InvalidOrigin(ref o)) if o == bad),
                "{bad} should be rejected"
            );
        }
    }
}
