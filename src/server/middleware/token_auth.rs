//! Session token middleware.
//!
//! Verifies the JWT and attaches [`AuthUser`] to the request. This layer
//! only authenticates; all authorization happens later through
//! `Gate::resolve`, which re-reads the user's role from storage. If the
//! token is missing or invalid the request continues without AuthUser and
//! protected handlers answer 401.

use std::sync::Arc;

use axum::{middleware::Next, response::Response};
use tracing::debug;

use crate::common::auth::Role;
use crate::common::UserId;
use crate::domains::auth::JwtService;

/// Verified credential for one request.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
    /// Role snapshot from the token. Logging only; decisions use the live
    /// role from storage.
    pub role_at_issuance: Role,
}

/// Token authentication middleware
///
/// The browser client sends the session as a `token` cookie; the mobile
/// client uses an `Authorization: Bearer` header. The cookie wins when both
/// are present.
pub async fn token_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(user) = extract_auth_user(&request, &jwt_service) {
        debug!(user_id = %user.user_id, "authenticated request");
        request.extensions_mut().insert(user);
    } else {
        debug!("no valid session token");
    }

    next.run(request).await
}

fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let token = cookie_token(request).or_else(|| bearer_token(request))?;
    let claims = jwt_service.verify_token(&token).ok()?;

    Some(AuthUser {
        user_id: claims.user_id,
        email: claims.email,
        role_at_issuance: claims.role,
    })
}

fn cookie_token(request: &axum::http::Request<axum::body::Body>) -> Option<String> {
    let header = request.headers().get("cookie")?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "token").then(|| value.to_string())
    })
}

fn bearer_token(request: &axum::http::Request<axum::body::Body>) -> Option<String> {
    let header = request.headers().get("authorization")?.to_str().ok()?;
    Some(header.strip_prefix("Bearer ").unwrap_or(header).to_string())
}
