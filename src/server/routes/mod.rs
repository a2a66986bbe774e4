//! Route handlers.
//!
//! Handlers stay thin: parse the path and payload, run the authorization
//! combinator, call the domain action, shape the response.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod children;
pub mod health;
pub mod injuries;
pub mod reminders;
pub mod upload;

use crate::common::auth::{Actor, Gate};
use crate::common::{ChildId, InjuryId};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

/// Resolve the verified credential into a live actor, or 401.
async fn resolve_actor(
    state: &AppState,
    auth: Option<&AuthUser>,
) -> Result<Actor, ApiError> {
    Gate::new(&state.deps)
        .resolve(auth.map(|a| a.user_id))
        .await
        .map_err(Into::into)
}

fn parse_child_id(raw: &str) -> Result<ChildId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid child ID format"))
}

fn parse_injury_id(raw: &str) -> Result<InjuryId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid injury ID format"))
}
