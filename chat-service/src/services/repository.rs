use crate::models::{Chat, Transaction, User};
use anyhow::Result;
use mongodb::options::IndexOptions;
use mongodb::{bson::doc, Collection, Database, IndexModel};

/// Data access for chats, transactions, and user credit balances.
///
/// Every chat and transaction lookup is scoped on both the aggregate id
/// and the owning user id, so one user can never read another's records.
#[derive(Clone)]
pub struct ChatRepository {
    chat_collection: Collection<Chat>,
    transaction_collection: Collection<Transaction>,
    user_collection: Collection<User>,
}

impl ChatRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            chat_collection: db.collection("chats"),
            transaction_collection: db.collection("transactions"),
            user_collection: db.collection("users"),
        }
    }

    /// Initialize database indexes for user-scoped queries.
    pub async fn init_indexes(&self) -> Result<()> {
        // Compound index on (user_id, _id) for owner-scoped chat lookups
        let user_chat_index = IndexModel::builder()
            .keys(doc! { "userId": 1, "_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_chat_idx".to_string())
                    .build(),
            )
            .build();

        self.chat_collection
            .create_indexes([user_chat_index], None)
            .await?;

        // Index on user_id for per-user transaction history
        let user_tx_index = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_transaction_idx".to_string())
                    .build(),
            )
            .build();

        self.transaction_collection
            .create_indexes([user_tx_index], None)
            .await?;

        tracing::info!("Chat service indexes initialized");
        Ok(())
    }

    /// Find a chat by id within the owning user's scope.
    pub async fn find_chat_for_user(&self, user_id: &str, chat_id: &str) -> Result<Option<Chat>> {
        let filter = doc! {
            "_id": chat_id,
            "userId": user_id
        };
        let chat = self.chat_collection.find_one(filter, None).await?;
        Ok(chat)
    }

    /// List a user's chats, most recently touched first.
    pub async fn list_chats_for_user(&self, user_id: &str) -> Result<Vec<Chat>> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let filter = doc! { "userId": user_id };
        let options = FindOptions::builder()
            .sort(doc! { "updatedAt": -1 })
            .build();

        let cursor = self.chat_collection.find(filter, Some(options)).await?;
        let chats: Vec<Chat> = cursor.try_collect().await?;
        Ok(chats)
    }

    pub async fn create_chat(&self, chat: &Chat) -> Result<()> {
        self.chat_collection.insert_one(chat, None).await?;
        Ok(())
    }

    /// Persist a mutated chat, replacing the stored document.
    ///
    /// Not atomic against the credit debit that follows it; a fault
    /// between the two writes leaves one applied without the other.
    pub async fn save_chat(&self, chat: &Chat) -> Result<()> {
        let filter = doc! {
            "_id": &chat.id,
            "userId": &chat.user_id
        };
        self.chat_collection.replace_one(filter, chat, None).await?;
        Ok(())
    }

    pub async fn create_transaction(&self, transaction: &Transaction) -> Result<()> {
        self.transaction_collection
            .insert_one(transaction, None)
            .await?;
        Ok(())
    }

    /// Decrement a user's credit balance by `amount`.
    pub async fn debit_credits(&self, user_id: &str, amount: i64) -> Result<()> {
        let filter = doc! { "_id": user_id };
        let update = doc! { "$inc": { "credits": -amount } };
        self.user_collection.update_one(filter, update, None).await?;
        Ok(())
    }
}
