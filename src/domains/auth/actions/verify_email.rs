//! Email verification via the one-time link.

use chrono::Utc;
use tracing::{info, warn};

use crate::domains::auth::actions::AuthFlowError;
use crate::domains::auth::tokens;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Redeem a verification token. Idempotent tokens are not supported: once
/// redeemed, the digest is cleared and the same link fails.
pub async fn verify_email(token: &str, deps: &ServerDeps) -> Result<User, AuthFlowError> {
    if token.is_empty() {
        return Err(AuthFlowError::BadToken);
    }

    let digest = tokens::digest_of(token);
    let Some(mut user) = deps.users.find_by_verification_digest(&digest).await? else {
        return Err(AuthFlowError::BadToken);
    };

    match user.email_verification_expires {
        Some(expires) if expires > Utc::now() => {}
        _ => return Err(AuthFlowError::BadToken),
    }

    user.is_email_verified = true;
    user.email_verification_digest = None;
    user.email_verification_expires = None;
    user.updated_at = Utc::now();
    deps.users.update(&user).await?;
    info!(user_id = %user.id, "email verified");

    if let Err(err) = deps.mailer.send_welcome_email(&user.email, &user.name).await {
        warn!(user_id = %user.id, error = %err, "failed to send welcome email");
    }

    Ok(user)
}
