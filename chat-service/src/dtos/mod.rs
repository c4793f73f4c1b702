use crate::models::{Chat, Message, Plan};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub success: bool,
    /// Hosted checkout page to redirect the caller to.
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PlansResponse<'a> {
    pub success: bool,
    pub plans: &'a [Plan],
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageRequest {
    /// Absent or unknown ids start a fresh chat.
    #[serde(default)]
    pub chat_id: Option<String>,
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImageMessageRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,
    /// Propagated verbatim onto the assistant image reply.
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatsResponse {
    pub success: bool,
    pub chats: Vec<Chat>,
}

/// Envelope for both message turns. Every outcome is an HTTP 200; callers
/// branch on the `success` flag, not the status code.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TurnResponse {
    #[serde(rename_all = "camelCase")]
    Completed {
        success: bool,
        reply: Message,
        chat_id: String,
    },
    Failed {
        success: bool,
        message: String,
    },
}

impl TurnResponse {
    pub fn completed(reply: Message, chat_id: String) -> Self {
        TurnResponse::Completed {
            success: true,
            reply,
            chat_id,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        TurnResponse::Failed {
            success: false,
            message: message.into(),
        }
    }
}
