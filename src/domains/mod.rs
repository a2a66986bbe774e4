// Domain modules: models + actions per domain.

pub mod auth;
pub mod children;
pub mod injuries;
pub mod reports;
pub mod users;

use crate::common::auth::AuthError;

/// Outcome of a CRUD action. The route layer maps each variant to exactly
/// one status code.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// Bad payload or malformed id in the path.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
