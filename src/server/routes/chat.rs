//! Recovery assistant chat.

use axum::extract::Extension;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::kernel::response_cache::ResponseCache;
use crate::kernel::ChatMessage;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;
use crate::server::routes::resolve_actor;

#[derive(Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

pub async fn chat_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(input): Json<ChatInput>,
) -> Result<impl IntoResponse, ApiError> {
    resolve_actor(&state, auth.as_deref()).await?;

    if input.messages.iter().all(|m| m.role != "user") {
        return Err(ApiError::bad_request("Messages are required"));
    }

    let key = ResponseCache::key(&input.messages);
    if let Some(reply) = state.deps.chat_cache.get(&key) {
        return Ok(Json(json!({ "reply": reply, "cached": true })));
    }

    let reply = state.deps.assistant.reply(&input.messages).await?;
    state.deps.chat_cache.put(key, reply.clone());
    Ok(Json(json!({ "reply": reply, "cached": false })))
}
