//! Request handlers
//!
//! One handler per operation. Authentication runs as route middleware
//! before any of these, so every handler can extract a `Ctx`.

pub mod chat;
pub mod message;

pub use chat::{create_chat, list_chats};
pub use message::{get_chat_messages, send_message};
