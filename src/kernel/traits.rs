// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (authorization decisions, validation) lives in domain
// functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseUserStore, BaseMailer)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{ChildId, InjuryId, UserId};
use crate::domains::children::models::Child;
use crate::domains::injuries::models::Injury;
use crate::domains::users::models::{User, UserCounts, UserWithChildCount};

// =============================================================================
// User Store
// =============================================================================

#[async_trait]
pub trait BaseUserStore: Send + Sync {
    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<()>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Lookup is by lowercased email; callers may pass any casing.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_verification_digest(&self, digest: &str) -> Result<Option<User>>;

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>>;

    async fn insert(&self, user: &User) -> Result<()>;

    async fn update(&self, user: &User) -> Result<()>;

    /// All users with their child counts, newest first. Admin listing.
    async fn list_with_child_counts(&self) -> Result<Vec<UserWithChildCount>>;

    async fn counts(&self) -> Result<UserCounts>;
}

// =============================================================================
// Child Store
// =============================================================================

#[async_trait]
pub trait BaseChildStore: Send + Sync {
    async fn find_by_id(&self, id: ChildId) -> Result<Option<Child>>;

    /// Children owned by one parent, newest first.
    async fn find_by_parent(&self, parent_id: UserId) -> Result<Vec<Child>>;

    /// Every child with the parent reference expanded. Admin export.
    async fn find_all_expanded(&self) -> Result<Vec<Child>>;

    async fn insert(&self, child: &Child) -> Result<()>;

    async fn update(&self, child: &Child) -> Result<()>;

    /// Removes the child and every injury recorded against them.
    async fn delete_cascading(&self, id: ChildId) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}

// =============================================================================
// Injury Store
// =============================================================================

#[async_trait]
pub trait BaseInjuryStore: Send + Sync {
    async fn find_by_id(&self, id: InjuryId) -> Result<Option<Injury>>;

    /// Injuries for one child, newest first.
    async fn find_by_child(&self, child_id: ChildId) -> Result<Vec<Injury>>;

    /// Injuries across every child the parent owns, child reference expanded.
    async fn find_for_parent(&self, parent_id: UserId) -> Result<Vec<Injury>>;

    /// Every injury with the child (and its parent) expanded. Admin export.
    async fn find_all_expanded(&self) -> Result<Vec<Injury>>;

    async fn insert(&self, injury: &Injury) -> Result<()>;

    async fn update(&self, injury: &Injury) -> Result<()>;

    async fn delete(&self, id: InjuryId) -> Result<()>;

    async fn count(&self) -> Result<i64>;

    /// Injuries not yet marked as fully recovered.
    async fn count_active(&self) -> Result<i64>;

    /// Active injuries whose last reminder is older than `stale_after`
    /// (or was never sent), child expanded so the parent can be mailed.
    async fn find_needing_reminder(&self, stale_after: DateTime<Utc>) -> Result<Vec<Injury>>;

    async fn mark_reminder_sent(&self, id: InjuryId, at: DateTime<Utc>) -> Result<()>;
}

// =============================================================================
// Mailer
// =============================================================================

#[async_trait]
pub trait BaseMailer: Send + Sync {
    async fn send_verification_email(&self, to: &str, name: &str, verify_url: &str) -> Result<()>;

    async fn send_welcome_email(&self, to: &str, name: &str) -> Result<()>;

    async fn send_password_reset_email(&self, to: &str, name: &str, reset_url: &str) -> Result<()>;

    async fn send_injury_reminder_email(
        &self,
        to: &str,
        parent_name: &str,
        child_name: &str,
        injury_kind: &str,
    ) -> Result<()>;
}

// =============================================================================
// Image Store
// =============================================================================

#[async_trait]
pub trait BaseImageStore: Send + Sync {
    /// Persists the bytes and returns a publicly servable URL.
    async fn store(&self, extension: &str, bytes: Vec<u8>) -> Result<String>;
}

// =============================================================================
// Assistant
// =============================================================================

/// One turn of a recovery-chat conversation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[async_trait]
pub trait BaseAssistant: Send + Sync {
    /// Produce the assistant reply for a conversation. The last message is
    /// the user's newest question.
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String>;
}
