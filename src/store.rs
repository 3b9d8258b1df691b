//! Data store adapter
//!
//! Thin wrapper over the two MongoDB collections. All query semantics live
//! here; handlers only see typed operations.

use crate::error::{Error, Result};
use crate::models::{Chat, LatestMessage, Message};
use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use tracing::info;

pub struct ChatStore {
    chats: Collection<Chat>,
    messages: Collection<Message>,
}

impl ChatStore {
    /// Connect to MongoDB. The driver connects lazily, so this succeeds
    /// even before the database is reachable; the first query surfaces
    /// connectivity problems.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);

        info!("Connected to MongoDB database {}", db_name);

        Ok(Self {
            chats: db.collection("chats"),
            messages: db.collection("messages"),
        })
    }

    /// The unique chat containing exactly the unordered pair {a, b}.
    pub async fn find_chat_between(&self, a: &str, b: &str) -> Result<Option<Chat>> {
        let chat = self
            .chats
            .find_one(doc! {
                "users": { "$all": [a, b], "$size": 2 }
            })
            .await?;
        Ok(chat)
    }

    pub async fn create_chat(&self, a: &str, b: &str) -> Result<Chat> {
        let mut chat = Chat::new(a, b);
        let result = self.chats.insert_one(&chat).await?;
        chat.id = result.inserted_id.as_object_id();
        Ok(chat)
    }

    pub async fn chat_by_id(&self, id: &ObjectId) -> Result<Option<Chat>> {
        let chat = self.chats.find_one(doc! { "_id": id }).await?;
        Ok(chat)
    }

    /// All chats containing `user_id`, most recently active first.
    pub async fn chats_for_user(&self, user_id: &str) -> Result<Vec<Chat>> {
        let chats = self
            .chats
            .find(doc! { "users": user_id })
            .sort(doc! { "updatedAt": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(chats)
    }

    /// Overwrite the denormalized preview and bump the activity timestamp.
    /// Deliberately a separate write from the message insert; see the
    /// module docs on `handlers::message`.
    pub async fn set_latest_message(
        &self,
        chat_id: &ObjectId,
        preview: &LatestMessage,
    ) -> Result<()> {
        let preview =
            bson::to_bson(preview).map_err(|e| Error::Internal(e.to_string()))?;
        self.chats
            .update_one(
                doc! { "_id": chat_id },
                doc! { "$set": {
                    "latestMessage": preview,
                    "updatedAt": bson::DateTime::now(),
                } },
            )
            .await?;
        Ok(())
    }

    pub async fn insert_message(&self, mut message: Message) -> Result<Message> {
        let result = self.messages.insert_one(&message).await?;
        message.id = result.inserted_id.as_object_id();
        Ok(message)
    }

    /// All messages in a chat, oldest first.
    pub async fn messages_for_chat(&self, chat_id: &ObjectId) -> Result<Vec<Message>> {
        let messages = self
            .messages
            .find(doc! { "chatId": chat_id })
            .sort(doc! { "createdAt": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    /// Messages in a chat sent by someone other than `viewer` and not yet
    /// seen by them.
    pub async fn unseen_count(&self, chat_id: &ObjectId, viewer: &str) -> Result<u64> {
        let count = self
            .messages
            .count_documents(doc! {
                "chatId": chat_id,
                "sender": { "$ne": viewer },
                "seen": false,
            })
            .await?;
        Ok(count)
    }

    /// Bulk seen transition: everything `viewer` had not yet seen in the
    /// chat becomes seen now. Re-running is a no-op.
    pub async fn mark_seen(&self, chat_id: &ObjectId, viewer: &str) -> Result<u64> {
        let result = self
            .messages
            .update_many(
                doc! {
                    "chatId": chat_id,
                    "sender": { "$ne": viewer },
                    "seen": false,
                },
                doc! { "$set": {
                    "seen": true,
                    "seenAt": bson::DateTime::now(),
                } },
            )
            .await?;
        Ok(result.modified_count)
    }
}
