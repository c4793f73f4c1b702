use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub stripe: StripeConfig,
    pub gemini: GeminiConfig,
    pub imagekit: ImageKitConfig,
    /// Fallback redirect origin when the request carries no Origin header.
    pub client_url: String,
    /// Application tag attached to checkout-session metadata.
    pub app_id: String,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: Secret<String>,
    pub api_base_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub api_base_url: String,
    pub model: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ImageKitConfig {
    /// CDN endpoint serving on-the-fly AI image generation.
    pub url_endpoint: String,
    pub upload_url: String,
    pub private_key: Secret<String>,
    /// Media library folder uploads land in.
    pub folder: String,
    /// Timeout for fetching a generated image, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("CHAT_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("CHAT_SERVICE_PORT")
            .unwrap_or_else(|_| "3004".to_string())
            .parse()?;

        let db_url = env::var("CHAT_DATABASE_URL").context("CHAT_DATABASE_URL must be set")?;
        let db_name = env::var("CHAT_DATABASE_NAME").unwrap_or_else(|_| "chat_db".to_string());

        let stripe_secret_key =
            env::var("STRIPE_SECRET_KEY").context("STRIPE_SECRET_KEY must be set")?;
        let stripe_api_base_url = env::var("STRIPE_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string());

        let gemini_api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;
        let gemini_api_base_url = env::var("GEMINI_API_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let imagekit_url_endpoint =
            env::var("IMAGEKIT_URL_ENDPOINT").context("IMAGEKIT_URL_ENDPOINT must be set")?;
        let imagekit_upload_url = env::var("IMAGEKIT_UPLOAD_URL")
            .unwrap_or_else(|_| "https://upload.imagekit.io/api/v1/files/upload".to_string());
        let imagekit_private_key =
            env::var("IMAGEKIT_PRIVATE_KEY").context("IMAGEKIT_PRIVATE_KEY must be set")?;

        let app_id = env::var("APP_ID").unwrap_or_else(|_| "sparkchat".to_string());
        let client_url =
            env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            stripe: StripeConfig {
                secret_key: Secret::new(stripe_secret_key),
                api_base_url: stripe_api_base_url,
            },
            gemini: GeminiConfig {
                api_key: Secret::new(gemini_api_key),
                api_base_url: gemini_api_base_url,
                model: gemini_model,
            },
            imagekit: ImageKitConfig {
                url_endpoint: imagekit_url_endpoint,
                upload_url: imagekit_upload_url,
                private_key: Secret::new(imagekit_private_key),
                folder: app_id.clone(),
                fetch_timeout_secs: 20,
            },
            client_url,
            app_id,
            service_name: "chat-service".to_string(),
        })
    }
}
