//! Message turn handlers.
//!
//! A turn is one user prompt plus its generated reply, appended to the
//! chat as two messages. Text turns cost 1 credit, image turns 2. Every
//! outcome is an HTTP 200 with a `success` flag in the payload; callers
//! must inspect the body to detect failure.

use axum::{extract::State, Json};
use thiserror::Error;
use validator::Validate;

use crate::{
    dtos::{ChatsResponse, ImageMessageRequest, TextMessageRequest, TurnResponse},
    middleware::AuthUser,
    models::{Chat, Message},
    services::imagekit,
    AppState,
};
use server_core::error::AppError;

const TEXT_TURN_COST: i64 = 1;
const IMAGE_TURN_COST: i64 = 2;

/// Failure kinds for a message turn. The wire format is still a plain
/// message string, but internally callers branch on the kind.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("You don't have enough credits")]
    InsufficientCredits,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    UpstreamUnavailable(String),

    #[error("{0}")]
    PersistenceFailure(String),
}

/// List the calling user's chats, most recently touched first.
pub async fn get_chats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ChatsResponse>, AppError> {
    let chats = state
        .repository
        .list_chats_for_user(&user.id)
        .await
        .map_err(AppError::InternalError)?;

    Ok(Json(ChatsResponse {
        success: true,
        chats,
    }))
}

/// Handle a text generation turn.
pub async fn text_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TextMessageRequest>,
) -> Json<TurnResponse> {
    match run_text_turn(&state, &user, payload).await {
        Ok((reply, chat_id)) => Json(TurnResponse::completed(reply, chat_id)),
        Err(err) => {
            tracing::warn!(user_id = %user.id, error = %err, "Text turn failed");
            Json(TurnResponse::failed(err.to_string()))
        }
    }
}

/// Handle an image generation turn.
pub async fn image_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ImageMessageRequest>,
) -> Json<TurnResponse> {
    match run_image_turn(&state, &user, payload).await {
        Ok((reply, chat_id)) => Json(TurnResponse::completed(reply, chat_id)),
        Err(err) => {
            tracing::warn!(user_id = %user.id, error = %err, "Image turn failed");
            Json(TurnResponse::failed(err.to_string()))
        }
    }
}

async fn run_text_turn(
    state: &AppState,
    user: &AuthUser,
    payload: TextMessageRequest,
) -> Result<(Message, String), TurnError> {
    payload
        .validate()
        .map_err(|e| TurnError::InvalidRequest(e.to_string()))?;

    if user.credits < TEXT_TURN_COST {
        return Err(TurnError::InsufficientCredits);
    }

    let mut chat = lookup_or_create_chat(state, user, payload.chat_id.as_deref()).await?;
    chat.push_message(Message::user(&payload.prompt));

    // Only the latest prompt is forwarded; prior history stays local.
    let completion = state
        .gemini
        .generate(&payload.prompt)
        .await
        .map_err(|e| TurnError::UpstreamUnavailable(e.to_string()))?;

    let reply = Message::assistant_text(completion);
    chat.push_message(reply.clone());

    state
        .repository
        .save_chat(&chat)
        .await
        .map_err(|e| TurnError::PersistenceFailure(e.to_string()))?;

    // Separate write from the chat save; a fault between the two leaves
    // the message persisted without the debit.
    state
        .repository
        .debit_credits(&user.id, TEXT_TURN_COST)
        .await
        .map_err(|e| TurnError::PersistenceFailure(e.to_string()))?;

    tracing::info!(user_id = %user.id, chat_id = %chat.id, "Text turn completed");

    Ok((reply, chat.id))
}

async fn run_image_turn(
    state: &AppState,
    user: &AuthUser,
    payload: ImageMessageRequest,
) -> Result<(Message, String), TurnError> {
    payload
        .validate()
        .map_err(|e| TurnError::InvalidRequest(e.to_string()))?;

    if user.credits < IMAGE_TURN_COST {
        return Err(TurnError::InsufficientCredits);
    }

    let mut chat = lookup_or_create_chat(state, user, payload.chat_id.as_deref()).await?;
    chat.push_message(Message::user(&payload.prompt));

    let file_stem = chrono::Utc::now().timestamp_millis();
    let generation_url = state.imagekit.generation_url(&payload.prompt, file_stem);

    // On fetch failure nothing below runs: the in-memory user message is
    // discarded and no credits move.
    let image_bytes = state
        .imagekit
        .fetch_generated_image(&generation_url)
        .await
        .map_err(|e| TurnError::UpstreamUnavailable(e.to_string()))?;

    let data_uri = imagekit::to_data_uri(&image_bytes);
    let file_name = format!("{}.png", file_stem);

    let uploaded = state
        .imagekit
        .upload(&data_uri, &file_name)
        .await
        .map_err(|e| TurnError::UpstreamUnavailable(e.to_string()))?;

    let reply = Message::assistant_image(uploaded.url, payload.is_published);
    chat.push_message(reply.clone());

    state
        .repository
        .save_chat(&chat)
        .await
        .map_err(|e| TurnError::PersistenceFailure(e.to_string()))?;

    state
        .repository
        .debit_credits(&user.id, IMAGE_TURN_COST)
        .await
        .map_err(|e| TurnError::PersistenceFailure(e.to_string()))?;

    tracing::info!(user_id = %user.id, chat_id = %chat.id, "Image turn completed");

    Ok((reply, chat.id))
}

/// Find the chat scoped to this user, or lazily create a fresh one.
///
/// Lookup and create are two separate operations; concurrent first
/// messages for the same missing id can create two chats.
async fn lookup_or_create_chat(
    state: &AppState,
    user: &AuthUser,
    chat_id: Option<&str>,
) -> Result<Chat, TurnError> {
    if let Some(chat_id) = chat_id {
        let existing = state
            .repository
            .find_chat_for_user(&user.id, chat_id)
            .await
            .map_err(|e| TurnError::PersistenceFailure(e.to_string()))?;
        if let Some(chat) = existing {
            return Ok(chat);
        }
    }

    let chat = Chat::new(&user.id, &user.name);
    state
        .repository
        .create_chat(&chat)
        .await
        .map_err(|e| TurnError::PersistenceFailure(e.to_string()))?;

    tracing::info!(user_id = %user.id, chat_id = %chat.id, "Created new chat");
    Ok(chat)
}
