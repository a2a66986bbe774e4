//! Children CRUD + per-child CSV export.

use axum::extract::{Extension, Path};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::common::auth::Access;
use crate::domains::children::actions;
use crate::domains::children::models::ChildInput;
use crate::domains::reports;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;
use crate::server::routes::{parse_child_id, resolve_actor};

pub async fn list_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let children = actions::list_children(&actor, &state.deps).await?;
    Ok(Json(children))
}

pub async fn create_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(input): Json<ChildInput>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let child = actions::create_child(&actor, input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

pub async fn get_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let id = parse_child_id(&id)?;
    let child = actions::get_child(&actor, id, &state.deps).await?;
    Ok(Json(child))
}

pub async fn update_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
    Json(input): Json<ChildInput>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let id = parse_child_id(&id)?;
    let child = actions::update_child(&actor, id, input, &state.deps).await?;
    Ok(Json(child))
}

pub async fn delete_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let id = parse_child_id(&id)?;
    actions::delete_child(&actor, id, &state.deps).await?;
    Ok(Json(json!({ "message": "Child deleted successfully" })))
}

/// CSV injury report for one child, same ownership rules as a read.
pub async fn export_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let id = parse_child_id(&id)?;

    let child = actor.can(Access::Read).child(id, &state.deps).await?;
    let injuries = state.deps.injuries.find_by_child(child.id).await?;
    let csv = reports::child_injury_report(&child, &injuries);

    let filename = format!(
        "{}-injury-report.csv",
        child.name.replace(|c: char| !c.is_alphanumeric(), "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}
