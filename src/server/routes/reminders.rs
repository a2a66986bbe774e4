//! Recovery reminder sweep, hit by the scheduler.

use axum::extract::Extension;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::domains::injuries::actions;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Email parents of active injuries that have gone quiet. Unauthenticated:
/// the platform cron invokes it and the response exposes only a count.
pub async fn send_handler(
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let sent = actions::send_reminders(&state.deps).await?;
    Ok(Json(json!({ "remindersSent": sent })))
}
