//! Authenticated-user extraction.
//!
//! The authentication layer in front of this service validates the
//! caller's session and forwards the user record through trusted
//! identity headers. Headers are only trusted because that layer strips
//! them from external traffic before they reach us.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use server_core::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_CREDITS_HEADER: &str = "x-user-credits";

/// Authenticated user record supplied by the upstream auth layer.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    /// Display name, denormalized onto chats the user creates.
    pub name: String,
    /// Credit balance at authentication time; precondition checks read
    /// this value, debits go to the user document.
    pub credits: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Unauthorized user")))?
            .to_string();

        let name = parts
            .headers
            .get(USER_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let credits = parts
            .headers
            .get(USER_CREDITS_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!("Missing or invalid credit balance"))
            })?;

        // Add to tracing span for observability
        let span = tracing::Span::current();
        span.record("user_id", id.as_str());

        Ok(AuthUser { id, name, credits })
    }
}
