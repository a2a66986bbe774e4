//! Admin surface: platform stats, user listing, data exports.
//!
//! Everything here is read-only by design; there is no admin mutation route.

use axum::extract::{Extension, Query};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::domains::reports;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;
use crate::server::routes::resolve_actor;

pub async fn stats_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    actor.require_admin()?;

    let users = state.deps.users.counts().await?;
    let total_children = state.deps.children.count().await?;
    let total_injuries = state.deps.injuries.count().await?;
    let active_injuries = state.deps.injuries.count_active().await?;

    Ok(Json(json!({
        "totalUsers": users.total_users,
        "verifiedUsers": users.verified_users,
        "unverifiedUsers": users.unverified_users,
        "totalChildren": total_children,
        "totalInjuries": total_injuries,
        "activeInjuries": active_injuries,
    })))
}

pub async fn users_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    actor.require_admin()?;

    let users = state.deps.users.list_with_child_counts().await?;
    Ok(Json(users))
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

fn check_format(query: &ExportQuery) -> Result<(), ApiError> {
    match query.format.as_deref() {
        None | Some("csv") => Ok(()),
        Some("pdf") => Err(ApiError::bad_request("PDF export is not supported")),
        Some(other) => Err(ApiError::bad_request(format!(
            "Unknown export format: {other}"
        ))),
    }
}

fn csv_response(filename: &str, csv: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
}

pub async fn export_children_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    actor.require_admin()?;
    check_format(&query)?;

    let children = state.deps.children.find_all_expanded().await?;
    Ok(csv_response(
        "children-export.csv",
        reports::admin_children_csv(&children),
    ))
}

pub async fn export_injuries_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    actor.require_admin()?;
    check_format(&query)?;

    let injuries = state.deps.injuries.find_all_expanded().await?;
    Ok(csv_response(
        "injuries-export.csv",
        reports::admin_injuries_csv(&injuries),
    ))
}
