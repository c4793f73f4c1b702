pub mod plan;

pub use plan::{find_plan, Plan, PLAN_CATALOGUE};

use chrono::Utc;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Author of an embedded chat message.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message embedded in a chat. Immutable once appended.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    /// Prompt or completion text; a hosted image URL when `is_image` is set.
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub is_image: bool,
    /// Only present on assistant image replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl Message {
    pub fn user(prompt: &str) -> Self {
        Self {
            role: Role::User,
            content: prompt.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            is_image: false,
            is_published: None,
        }
    }

    pub fn assistant_text(completion: String) -> Self {
        Self {
            role: Role::Assistant,
            content: completion,
            timestamp: Utc::now().timestamp_millis(),
            is_image: false,
            is_published: None,
        }
    }

    pub fn assistant_image(url: String, is_published: bool) -> Self {
        Self {
            role: Role::Assistant,
            content: url,
            timestamp: Utc::now().timestamp_millis(),
            is_image: true,
            is_published: Some(is_published),
        }
    }
}

/// A persisted conversation owned by a single user.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    /// Denormalized owner display name.
    pub user_name: String,
    pub name: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Chat {
    pub const DEFAULT_NAME: &'static str = "New Chat";

    pub fn new(user_id: &str, user_name: &str) -> Self {
        let now = DateTime::now();
        Self {
            id: new_id(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            name: Self::DEFAULT_NAME.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a message in conversation order.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = DateTime::now();
    }
}

/// One purchase attempt. `is_paid` flips via an out-of-band confirmation
/// flow; this service only ever writes it as `false`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub amount: f64,
    pub credits: u32,
    pub is_paid: bool,
    pub created_at: DateTime,
}

impl Transaction {
    pub fn unpaid(user_id: &str, plan: &Plan) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.to_string(),
            plan_id: plan.id.clone(),
            amount: plan.price,
            credits: plan.credits,
            is_paid: false,
            created_at: DateTime::now(),
        }
    }
}

/// User document owned by the auth subsystem. Only the credit balance is
/// mutated here, via `$inc` updates.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub credits: i64,
}
