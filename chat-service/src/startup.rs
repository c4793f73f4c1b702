//! Application startup and lifecycle management.

use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use server_core::middleware::tracing::request_id_middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::services::{ChatRepository, GeminiClient, ImageKitClient, StripeClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub config: Config,
    pub repository: ChatRepository,
    pub stripe: StripeClient,
    pub gemini: GeminiClient,
    pub imagekit: ImageKitClient,
}

pub struct Application {
    host: String,
    port: u16,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some(config.service_name.clone());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let repository = ChatRepository::new(&db);
        repository.init_indexes().await?;

        let stripe = StripeClient::new(config.stripe.clone(), config.app_id.clone());
        if stripe.is_configured() {
            tracing::info!("Stripe client initialized");
        } else {
            tracing::warn!("Stripe credentials not configured - purchases will fail");
        }

        let gemini = GeminiClient::new(config.gemini.clone());
        let imagekit = ImageKitClient::new(config.imagekit.clone());
        if !imagekit.is_configured() {
            tracing::warn!("ImageKit credentials not configured - image turns will fail");
        }

        let state = AppState {
            db,
            config: config.clone(),
            repository,
            stripe,
            gemini,
            imagekit,
        };

        Ok(Self {
            host: config.server.host,
            port: config.server.port,
            router: router(state),
        })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        let addr = listen_addr(&self.host, self.port);
        tracing::info!("Listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Build the full application router over a prepared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/credits/plans", get(handlers::credits::get_plans))
        .route(
            "/api/credits/purchase",
            post(handlers::credits::purchase_plan),
        )
        .route("/api/chats", get(handlers::messages::get_chats))
        .route("/api/messages/text", post(handlers::messages::text_message))
        .route(
            "/api/messages/image",
            post(handlers::messages::image_message),
        )
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

fn listen_addr(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_addr_uses_the_configured_host() {
        assert_eq!(listen_addr("127.0.0.1", 3004), "127.0.0.1:3004");
        assert_eq!(listen_addr("0.0.0.0", 8080), "0.0.0.0:8080");
    }
}
