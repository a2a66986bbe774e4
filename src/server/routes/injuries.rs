//! Injuries CRUD.

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::domains::injuries::actions;
use crate::domains::injuries::models::{NewInjury, UpdateInjury};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;
use crate::server::routes::{parse_injury_id, resolve_actor};

pub async fn list_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let injuries = actions::list_injuries(&actor, &state.deps).await?;
    Ok(Json(injuries))
}

pub async fn create_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(input): Json<NewInjury>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let injury = actions::create_injury(&actor, input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(injury)))
}

pub async fn get_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let id = parse_injury_id(&id)?;
    let injury = actions::get_injury(&actor, id, &state.deps).await?;
    Ok(Json(injury))
}

pub async fn update_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
    Json(input): Json<UpdateInjury>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let id = parse_injury_id(&id)?;
    let injury = actions::update_injury(&actor, id, input, &state.deps).await?;
    Ok(Json(injury))
}

pub async fn delete_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let id = parse_injury_id(&id)?;
    actions::delete_injury(&actor, id, &state.deps).await?;
    Ok(Json(json!({ "message": "Injury deleted successfully" })))
}
