//! Auth domain actions - business logic functions
//!
//! Actions are async functions called directly from route handlers. Each one
//! returns `AuthFlowError` so the handlers map outcomes to status codes in
//! one place.

mod login;
mod password_reset;
mod register;
mod verify_email;

pub use login::login;
pub use password_reset::{forgot_password, reset_password};
pub use register::{register, RegisterInput};
pub use verify_email::verify_email;

#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    /// Bad request payload (missing fields, weak password, no consent).
    #[error("{0}")]
    Invalid(String),

    #[error("An account with this email already exists")]
    EmailTaken,

    /// Unknown email and wrong password produce the same message.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please verify your email before logging in. We've sent a new verification link to your inbox.")]
    Unverified,

    #[error("Invalid or expired token")]
    BadToken,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
