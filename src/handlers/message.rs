//! Message handlers: multipart send and fetch-with-seen-marking
//!
//! SendMessage performs two separate writes (message insert, then chat
//! preview update) with no transaction between them. A crash in between
//! leaves the preview stale but never corrupts message history.

use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::models::{Message, MessageView, UserProfile};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use bson::oid::ObjectId;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message: MessageView,
    pub sender: String,
}

/// POST /api/v1/message
///
/// Multipart fields: `chatId` (required), `text`, `image`. At least one of
/// text and image must be present; an image may carry a text caption.
pub async fn send_message(
    State(state): State<AppState>,
    ctx: Ctx,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SendMessageResponse>)> {
    let mut chat_id = None;
    let mut text = None;
    let mut image: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        match field.name().unwrap_or("") {
            "chatId" => {
                chat_id = Some(field.text().await.map_err(|e| {
                    Error::BadRequest(format!("Invalid chatId field: {e}"))
                })?);
            }
            "text" => {
                text = Some(field.text().await.map_err(|e| {
                    Error::BadRequest(format!("Invalid text field: {e}"))
                })?);
            }
            "image" => {
                let filename = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    Error::BadRequest(format!("Invalid image field: {e}"))
                })?;
                image = Some((filename, data));
            }
            _ => {}
        }
    }

    let chat_id = chat_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::BadRequest("chatId is required".to_string()))?;
    let chat_id = ObjectId::parse_str(&chat_id)
        .map_err(|_| Error::BadRequest("chatId is not a valid id".to_string()))?;
    // Empty text counts as absent; image captions may still be empty.
    let text = text.filter(|t| !t.is_empty());

    let chat = state
        .store
        .chat_by_id(&chat_id)
        .await?
        .ok_or_else(|| Error::NotFound("Chat not found".to_string()))?;

    let sender = ctx.user_id();
    if !chat.is_participant(sender) {
        return Err(Error::Forbidden("You are not part of this chat".to_string()));
    }
    let recipient = chat
        .counterpart_of(sender)
        .ok_or_else(|| Error::BadRequest("No other user in this chat".to_string()))?
        .to_string();

    let message = match (image, text) {
        (Some((filename, data)), caption) => {
            let image_ref = state.media.store(filename.as_deref(), data).await?;
            Message::image(chat_id, sender, caption, image_ref)
        }
        (None, Some(body)) => Message::text(chat_id, sender, body),
        (None, None) => {
            return Err(Error::BadRequest(
                "Either text or image is required".to_string(),
            ));
        }
    };

    let message = state.store.insert_message(message).await?;
    state
        .store
        .set_latest_message(&chat_id, &message.preview())
        .await?;

    state.notifier.message_sent(&message, &recipient);
    info!("Message sent in chat {} by {}", chat_id.to_hex(), sender);

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            message: message.into(),
            sender: sender.to_string(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct ChatMessagesResponse {
    pub messages: Vec<MessageView>,
    pub user: UserProfile,
}

/// GET /api/v1/message/{chat_id}
///
/// Marks everything the caller had not yet seen as seen, then returns the
/// full history oldest-first together with the counterpart's profile
/// (sentinel on directory failure).
pub async fn get_chat_messages(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatMessagesResponse>> {
    let chat_id = ObjectId::parse_str(&chat_id)
        .map_err(|_| Error::BadRequest("chatId is not a valid id".to_string()))?;

    let chat = state
        .store
        .chat_by_id(&chat_id)
        .await?
        .ok_or_else(|| Error::NotFound("No chat found".to_string()))?;

    let caller = ctx.user_id();
    if !chat.is_participant(caller) {
        return Err(Error::Forbidden("You are not part of this chat".to_string()));
    }

    // Seen transition first so the returned batch reflects it.
    state.store.mark_seen(&chat_id, caller).await?;
    let messages = state.store.messages_for_chat(&chat_id).await?;

    let user = match chat.counterpart_of(caller) {
        Some(counterpart) => state.directory.resolve(counterpart).await,
        None => UserProfile::unknown(caller),
    };

    Ok(Json(ChatMessagesResponse {
        messages: messages.into_iter().map(Into::into).collect(),
        user,
    }))
}
