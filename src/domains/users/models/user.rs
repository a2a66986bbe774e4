use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::auth::Role;
use crate::common::UserId;

/// Consent text shown at registration. Versioned so records show what the
/// parent actually agreed to.
pub const CONSENT_VERSION: &str = "v1.0";
pub const CONSENT_TEXT: &str = "I understand that Next Play Recovery (including the Resource Center) is for informational use only and not medical advice. I agree to the Terms of Use, Privacy Policy, and Disclaimer, consent to the storage of my data (including optional photos), and confirm I am 13 or older (with parent/guardian consent if under 18).";

/// A registered account (parent or admin).
///
/// `role` is mutable after creation by direct administrative action, which is
/// why authorization re-reads it from storage instead of trusting the role
/// snapshot inside a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Stored lowercased; lookups lowercase their input.
    pub email: String,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub is_email_verified: bool,
    #[serde(skip_serializing, default)]
    pub email_verification_digest: Option<String>,
    #[serde(skip_serializing, default)]
    pub email_verification_expires: Option<DateTime<Utc>>,
    #[serde(skip_serializing, default)]
    pub password_reset_digest: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub consent_accepted: bool,
    pub consent_version: String,
    pub consent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New unverified parent account. Registration never creates admins;
    /// promotion happens by direct administrative action afterwards.
    pub fn new_parent(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email: email.to_lowercase(),
            name,
            password_hash,
            role: Role::Parent,
            is_email_verified: false,
            email_verification_digest: None,
            email_verification_expires: None,
            password_reset_digest: None,
            password_reset_expires: None,
            consent_accepted: true,
            consent_version: CONSENT_VERSION.to_string(),
            consent_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Representation safe to return to clients (no hash, no token digests).
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            is_email_verified: self.is_email_verified,
            created_at: self.created_at,
        }
    }
}

/// Client-facing account view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Admin user listing row: account plus how many children it has registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithChildCount {
    #[serde(flatten)]
    pub user: PublicUser,
    pub children_count: i64,
}

/// Aggregate account counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub total_users: i64,
    pub verified_users: i64,
    pub unverified_users: i64,
}
