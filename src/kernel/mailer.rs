//! Outbound email.
//!
//! No SMTP credentials are wired up yet, so the default mailer writes each
//! message to the log. The links still work against a local frontend, which
//! is enough for development and staging.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::kernel::traits::BaseMailer;

pub struct LogMailer;

#[async_trait]
impl BaseMailer for LogMailer {
    async fn send_verification_email(&self, to: &str, name: &str, verify_url: &str) -> Result<()> {
        info!(to, name, verify_url, "email: verify your account");
        Ok(())
    }

    async fn send_welcome_email(&self, to: &str, name: &str) -> Result<()> {
        info!(to, name, "email: welcome to Next Play Recovery");
        Ok(())
    }

    async fn send_password_reset_email(&self, to: &str, name: &str, reset_url: &str) -> Result<()> {
        info!(to, name, reset_url, "email: password reset");
        Ok(())
    }

    async fn send_injury_reminder_email(
        &self,
        to: &str,
        parent_name: &str,
        child_name: &str,
        injury_kind: &str,
    ) -> Result<()> {
        info!(
            to,
            parent_name, child_name, injury_kind, "email: recovery check-in reminder"
        );
        Ok(())
    }
}
