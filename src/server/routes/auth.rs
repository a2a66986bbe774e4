//! Session and account lifecycle endpoints.

use axum::extract::Extension;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::domains::auth::{actions as auth_actions, TOKEN_TTL_SECONDS};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;
use crate::server::routes::resolve_actor;

fn session_cookie(token: &str, secure: bool) -> String {
    format!(
        "token={token}; HttpOnly; Path=/; Max-Age={TOKEN_TTL_SECONDS}; SameSite=Strict{}",
        if secure { "; Secure" } else { "" }
    )
}

fn clear_cookie(secure: bool) -> String {
    session_cookie("", secure).replace(
        &format!("Max-Age={TOKEN_TTL_SECONDS}"),
        "Max-Age=0",
    )
}

pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<auth_actions::RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = auth_actions::register(input, &state.deps).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful. Please check your email to verify your account.",
            "user": user.public(),
        })),
    ))
}

#[derive(Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = auth_actions::login(&input.email, &input.password, &state.deps).await?;
    let token = state.deps.jwt.create_token(&user)?;

    Ok((
        [(
            header::SET_COOKIE,
            session_cookie(&token, state.secure_cookies),
        )],
        Json(json!({ "user": user.public(), "token": token })),
    ))
}

pub async fn logout_handler(
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_cookie(state.secure_cookies))],
        Json(json!({ "message": "Logged out" })),
    )
}

/// Current account, read live from storage. A token for a deleted account
/// gets 401, not a stale profile.
pub async fn me_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = resolve_actor(&state, auth.as_deref()).await?;
    let user = state
        .deps
        .users
        .find_by_id(actor.id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;
    Ok(Json(json!({ "user": user.public() })))
}

#[derive(Deserialize)]
pub struct TokenInput {
    #[serde(default)]
    pub token: String,
}

pub async fn verify_email_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<TokenInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth_actions::verify_email(&input.token, &state.deps).await?;
    Ok(Json(json!({ "message": "Email verified successfully" })))
}

#[derive(Deserialize)]
pub struct ForgotPasswordInput {
    #[serde(default)]
    pub email: String,
}

pub async fn forgot_password_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<ForgotPasswordInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth_actions::forgot_password(&input.email, &state.deps).await?;
    Ok(Json(json!({
        "message": "If that email is registered, a reset link has been sent."
    })))
}

#[derive(Deserialize)]
pub struct ResetPasswordInput {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
}

pub async fn reset_password_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<ResetPasswordInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth_actions::reset_password(&input.token, &input.password, &state.deps).await?;
    Ok(Json(json!({ "message": "Password reset successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_shape() {
        let cookie = session_cookie("abc", false);
        assert!(cookie.starts_with("token=abc; HttpOnly; Path=/;"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));
        assert!(session_cookie("abc", true).ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_cookie(false);
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
