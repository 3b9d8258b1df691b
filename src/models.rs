//! Stored documents and wire views
//!
//! Stored structs map 1:1 onto BSON documents (camelCase keys, `_id`
//! assigned by the store). Views are what goes out over HTTP, with
//! timestamps converted to RFC3339 via chrono.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized snapshot of the most recent message, kept on the chat so
/// listings never have to touch the messages collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestMessage {
    pub text: String,
    pub sender: String,
}

/// A two-party chat thread
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Exactly two user ids, stored as plain strings so comparison against
    /// JWT-sourced ids never crosses an ObjectId/string boundary.
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_message: Option<LatestMessage>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl Chat {
    pub fn new(user_a: impl Into<String>, user_b: impl Into<String>) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: None,
            users: vec![user_a.into(), user_b.into()],
            latest_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.users.iter().any(|u| u == user_id)
    }

    /// The participant who is not `user_id`, if there is one.
    pub fn counterpart_of(&self, user_id: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.as_str() != user_id)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
}

/// Storage reference for an uploaded image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub url: String,
    pub public_id: String,
}

/// A single text or image message belonging to one chat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub chat_id: ObjectId,
    pub sender: String,
    pub message_type: MessageType,
    /// Message body, or caption for image messages ("" allowed).
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub seen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen_at: Option<bson::DateTime>,
    pub created_at: bson::DateTime,
}

impl Message {
    pub fn text(chat_id: ObjectId, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: None,
            chat_id,
            sender: sender.into(),
            message_type: MessageType::Text,
            text: text.into(),
            image: None,
            seen: false,
            seen_at: None,
            created_at: bson::DateTime::now(),
        }
    }

    pub fn image(
        chat_id: ObjectId,
        sender: impl Into<String>,
        caption: Option<String>,
        image: ImageRef,
    ) -> Self {
        Self {
            id: None,
            chat_id,
            sender: sender.into(),
            message_type: MessageType::Image,
            text: caption.unwrap_or_default(),
            image: Some(image),
            seen: false,
            seen_at: None,
            created_at: bson::DateTime::now(),
        }
    }

    /// Snapshot stored on the owning chat after a send.
    pub fn preview(&self) -> LatestMessage {
        let text = match self.message_type {
            MessageType::Image => "📷 image".to_string(),
            MessageType::Text => self.text.clone(),
        };
        LatestMessage {
            text,
            sender: self.sender.clone(),
        }
    }
}

/// Profile returned by the external user service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfile {
    /// Sentinel used when the user directory cannot be reached.
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "Unknown user".to_string(),
            email: None,
        }
    }
}

/// Chat as it appears in the chat listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub id: String,
    pub users: Vec<String>,
    pub latest_message: Option<LatestMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub unseen_count: u64,
}

impl ChatView {
    pub fn from_chat(chat: Chat, unseen_count: u64) -> Self {
        Self {
            id: chat.id.map(|id| id.to_hex()).unwrap_or_default(),
            users: chat.users,
            latest_message: chat.latest_message,
            created_at: chat.created_at.to_chrono(),
            updated_at: chat.updated_at.to_chrono(),
            unseen_count,
        }
    }
}

/// Message as returned over HTTP
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub chat_id: String,
    pub sender: String,
    pub message_type: MessageType,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub seen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.map(|id| id.to_hex()).unwrap_or_default(),
            chat_id: message.chat_id.to_hex(),
            sender: message.sender,
            message_type: message.message_type,
            text: message.text,
            image: message.image,
            seen: message.seen,
            seen_at: message.seen_at.map(|at| at.to_chrono()),
            created_at: message.created_at.to_chrono(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counterpart_is_the_other_participant() {
        let chat = Chat::new("alice", "bob");
        assert_eq!(chat.counterpart_of("alice"), Some("bob"));
        assert_eq!(chat.counterpart_of("bob"), Some("alice"));
        assert!(chat.is_participant("alice"));
        assert!(!chat.is_participant("carol"));
    }

    #[test]
    fn degenerate_self_pair_has_no_counterpart() {
        let chat = Chat::new("alice", "alice");
        assert_eq!(chat.counterpart_of("alice"), None);
    }

    #[test]
    fn image_message_defaults_caption_to_empty() {
        let image = ImageRef {
            url: "http://localhost:5002/media/abc.png".to_string(),
            public_id: "abc".to_string(),
        };
        let message = Message::image(ObjectId::new(), "alice", None, image);
        assert_eq!(message.message_type, MessageType::Image);
        assert_eq!(message.text, "");
        assert!(message.image.is_some());
        assert!(!message.seen);
        assert!(message.seen_at.is_none());
    }

    #[test]
    fn preview_uses_camera_placeholder_for_images() {
        let chat_id = ObjectId::new();
        let text_message = Message::text(chat_id, "alice", "hi");
        assert_eq!(text_message.preview().text, "hi");
        assert_eq!(text_message.preview().sender, "alice");

        let image = ImageRef {
            url: "u".to_string(),
            public_id: "p".to_string(),
        };
        let image_message = Message::image(chat_id, "alice", Some("look".to_string()), image);
        assert_eq!(image_message.preview().text, "📷 image");
    }

    #[test]
    fn message_bson_keys_are_camel_case() {
        let message = Message::text(ObjectId::new(), "alice", "hi");
        let doc = bson::to_document(&message).unwrap();
        assert!(doc.contains_key("chatId"));
        assert!(doc.contains_key("messageType"));
        assert!(doc.contains_key("createdAt"));
        assert_eq!(doc.get_str("messageType").unwrap(), "text");
        // Unset optionals stay out of the document entirely.
        assert!(!doc.contains_key("_id"));
        assert!(!doc.contains_key("seenAt"));
        assert!(!doc.contains_key("image"));
    }
}
