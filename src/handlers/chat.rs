//! Chat handlers: create-or-get and listing

use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::models::{ChatView, UserProfile};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    #[serde(default)]
    pub other_user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatResponse {
    pub message: &'static str,
    pub chat_id: String,
}

/// POST /api/v1/chat/new
///
/// Idempotent on the unordered pair: a second request for the same two
/// users (in either order) returns the existing chat. The other user id is
/// not checked against the directory; chats are purely id-based.
pub async fn create_chat(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(input): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<CreateChatResponse>)> {
    let caller = ctx.user_id();
    let other_user_id = input
        .other_user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::BadRequest("otherUserId is required".to_string()))?;

    if let Some(existing) = state.store.find_chat_between(caller, &other_user_id).await? {
        return Ok((
            StatusCode::OK,
            Json(CreateChatResponse {
                message: "Chat already exists",
                chat_id: existing.id.map(|id| id.to_hex()).unwrap_or_default(),
            }),
        ));
    }

    let chat = state.store.create_chat(caller, &other_user_id).await?;
    info!("Created chat between {} and {}", caller, other_user_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateChatResponse {
            message: "New chat created",
            chat_id: chat.id.map(|id| id.to_hex()).unwrap_or_default(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct ChatListEntry {
    pub user: UserProfile,
    pub chat: ChatView,
}

#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatListEntry>,
}

/// GET /api/v1/chat/all
///
/// Chats containing the caller, most recently active first, each with its
/// unseen count and the counterpart's profile. Per-chat lookups run
/// concurrently; a directory outage degrades individual entries to the
/// sentinel profile instead of failing the listing.
pub async fn list_chats(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<ChatListResponse>> {
    let caller = ctx.user_id().to_string();
    let chats = state.store.chats_for_user(&caller).await?;

    let lookups = chats.into_iter().map(|chat| {
        let state = state.clone();
        let caller = caller.clone();
        async move {
            let counterpart = chat
                .counterpart_of(&caller)
                .unwrap_or(caller.as_str())
                .to_string();

            let (unseen_count, user) = tokio::join!(
                async {
                    match &chat.id {
                        Some(id) => state.store.unseen_count(id, &caller).await,
                        None => Ok(0),
                    }
                },
                state.directory.resolve(&counterpart),
            );

            Ok::<_, Error>(ChatListEntry {
                user,
                chat: ChatView::from_chat(chat, unseen_count?),
            })
        }
    });

    let chats = futures::future::join_all(lookups)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(ChatListResponse { chats }))
}
