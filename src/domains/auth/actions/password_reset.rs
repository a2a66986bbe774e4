//! Forgot-password and reset flows.

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::domains::auth::actions::AuthFlowError;
use crate::domains::auth::{password, tokens};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Issue a reset link if the email is registered.
///
/// Always succeeds from the caller's point of view so the endpoint cannot be
/// used to probe which emails have accounts.
pub async fn forgot_password(email: &str, deps: &ServerDeps) -> Result<(), AuthFlowError> {
    let Some(mut user) = deps.users.find_by_email(email).await? else {
        info!("password reset requested for unknown email");
        return Ok(());
    };

    let issued = tokens::issue(Duration::hours(1));
    user.password_reset_digest = Some(issued.digest);
    user.password_reset_expires = Some(issued.expires_at);
    user.updated_at = Utc::now();
    deps.users.update(&user).await?;

    let reset_url = format!("{}/reset-password?token={}", deps.app_base_url, issued.token);
    if let Err(err) = deps
        .mailer
        .send_password_reset_email(&user.email, &user.name, &reset_url)
        .await
    {
        warn!(user_id = %user.id, error = %err, "failed to send password reset email");
    }
    Ok(())
}

/// Redeem a reset token and set the new password.
pub async fn reset_password(
    token: &str,
    new_password: &str,
    deps: &ServerDeps,
) -> Result<User, AuthFlowError> {
    if new_password.len() < 8 {
        return Err(AuthFlowError::Invalid(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if token.is_empty() {
        return Err(AuthFlowError::BadToken);
    }

    let digest = tokens::digest_of(token);
    let Some(mut user) = deps.users.find_by_reset_digest(&digest).await? else {
        return Err(AuthFlowError::BadToken);
    };

    match user.password_reset_expires {
        Some(expires) if expires > Utc::now() => {}
        _ => return Err(AuthFlowError::BadToken),
    }

    user.password_hash = password::hash_password(new_password)?;
    user.password_reset_digest = None;
    user.password_reset_expires = None;
    user.updated_at = Utc::now();
    deps.users.update(&user).await?;
    info!(user_id = %user.id, "password reset");

    Ok(user)
}
