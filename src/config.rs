//! Service configuration

use std::env;

use ragserve_core::{Error, Result};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Configuration for the ragserve process, sourced from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub chroma_host: String,
    pub chroma_port: u16,
    pub host: String,
    pub port: u16,
    pub app_title: String,
    pub app_description: String,
}

impl AppConfig {
    /// Create configuration from environment variables.
    ///
    /// The API credential is required: without it the process refuses to
    /// start. Everything else has local-development defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let openai_api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            Error::Configuration(
                "OPENAI_API_KEY environment variable not found; set it in .env or the environment"
                    .to_string(),
            )
        })?;

        let openai_base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| ragserve_agent::DEFAULT_MODEL.to_string());

        let chroma_host = env::var("CHROMA_HOST").unwrap_or_else(|_| "localhost".to_string());
        let chroma_port = parse_port("CHROMA_PORT", 8000)?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_port("PORT", 8080)?;

        let app_title =
            env::var("APP_TITLE").unwrap_or_else(|_| "RAG Agent Service".to_string());
        let app_description = env::var("APP_DESCRIPTION").unwrap_or_else(|_| {
            "Chroma-backed knowledge base with a research agent".to_string()
        });

        Ok(Self {
            openai_api_key,
            openai_base_url,
            openai_model,
            chroma_host,
            chroma_port,
            host,
            port,
            app_title,
            app_description,
        })
    }
}

fn parse_port(name: &str, default: u16) -> Result<u16> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| Error::Configuration(format!("{name} must be a port number: {value}"))),
        Err(_) => Ok(default),
    }
}
