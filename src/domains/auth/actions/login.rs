//! Email + password login.

use chrono::Duration;
use tracing::{info, warn};

use crate::domains::auth::actions::AuthFlowError;
use crate::domains::auth::{password, tokens};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Check credentials and return the user. The route layer mints the session
/// token and cookie.
///
/// Unverified accounts are rejected with a fresh verification link so a
/// parent who lost the original email is not stranded.
pub async fn login(email: &str, pass: &str, deps: &ServerDeps) -> Result<User, AuthFlowError> {
    let Some(mut user) = deps.users.find_by_email(email).await? else {
        return Err(AuthFlowError::InvalidCredentials);
    };

    if !password::verify_password(pass, &user.password_hash)? {
        return Err(AuthFlowError::InvalidCredentials);
    }

    if !user.is_email_verified {
        let issued = tokens::issue(Duration::hours(24));
        user.email_verification_digest = Some(issued.digest);
        user.email_verification_expires = Some(issued.expires_at);
        user.updated_at = chrono::Utc::now();
        deps.users.update(&user).await?;

        let verify_url = format!("{}/verify-email?token={}", deps.app_base_url, issued.token);
        if let Err(err) = deps
            .mailer
            .send_verification_email(&user.email, &user.name, &verify_url)
            .await
        {
            warn!(user_id = %user.id, error = %err, "failed to re-send verification email");
        }
        return Err(AuthFlowError::Unverified);
    }

    info!(user_id = %user.id, "login succeeded");
    Ok(user)
}
