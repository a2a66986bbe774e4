//! Parent registration.

use chrono::Duration;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domains::auth::actions::AuthFlowError;
use crate::domains::auth::{password, tokens};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub consent_accepted: bool,
}

impl RegisterInput {
    fn validate(&self) -> Result<(), AuthFlowError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty()
        {
            return Err(AuthFlowError::Invalid(
                "Name, email and password are required".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(AuthFlowError::Invalid("Invalid email address".to_string()));
        }
        if self.password.len() < 8 {
            return Err(AuthFlowError::Invalid(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        if !self.consent_accepted {
            return Err(AuthFlowError::Invalid(
                "You must accept the consent terms to register".to_string(),
            ));
        }
        Ok(())
    }
}

/// Create an unverified parent account and send the verification email.
///
/// New accounts are always parents; admin accounts are provisioned out of
/// band.
pub async fn register(input: RegisterInput, deps: &ServerDeps) -> Result<User, AuthFlowError> {
    input.validate()?;

    if deps.users.find_by_email(&input.email).await?.is_some() {
        return Err(AuthFlowError::EmailTaken);
    }

    let hash = password::hash_password(&input.password)?;
    let mut user = User::new_parent(input.name.trim().to_string(), input.email, hash);

    let issued = tokens::issue(Duration::hours(24));
    user.email_verification_digest = Some(issued.digest);
    user.email_verification_expires = Some(issued.expires_at);

    deps.users.insert(&user).await?;
    info!(user_id = %user.id, "registered new parent account");

    let verify_url = format!("{}/verify-email?token={}", deps.app_base_url, issued.token);
    if let Err(err) = deps
        .mailer
        .send_verification_email(&user.email, &user.name, &verify_url)
        .await
    {
        // The account exists either way; login re-sends the link.
        warn!(user_id = %user.id, error = %err, "failed to send verification email");
    }

    Ok(user)
}
