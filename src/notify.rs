//! Real-time notification seam
//!
//! Delivery to the counterpart's live session is an external integration
//! point. The default implementation only logs; a socket-backed channel can
//! be slotted into `AppState` without touching the handlers.

use crate::models::Message;
use tracing::info;

pub trait Notifier: Send + Sync {
    /// Called after a message has been persisted and the chat preview
    /// updated. Best-effort; failures must not affect the send.
    fn message_sent(&self, message: &Message, recipient: &str);
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn message_sent(&self, message: &Message, recipient: &str) {
        info!(
            "Message {} in chat {} awaiting delivery to {}",
            message.id.map(|id| id.to_hex()).unwrap_or_default(),
            message.chat_id.to_hex(),
            recipient
        );
    }
}
