//! Server dependencies for handlers and domain actions (using traits for
//! testability).
//!
//! All external services sit behind trait objects so the same handlers run
//! against Postgres in production and in-memory stores in tests.

use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::response_cache::ResponseCache;
use crate::kernel::traits::{
    BaseAssistant, BaseChildStore, BaseImageStore, BaseInjuryStore, BaseMailer, BaseUserStore,
};

/// Central dependency container handed to every handler via Extension.
#[derive(Clone)]
pub struct ServerDeps {
    pub users: Arc<dyn BaseUserStore>,
    pub children: Arc<dyn BaseChildStore>,
    pub injuries: Arc<dyn BaseInjuryStore>,
    pub mailer: Arc<dyn BaseMailer>,
    pub images: Arc<dyn BaseImageStore>,
    pub assistant: Arc<dyn BaseAssistant>,
    /// JWT service for session token creation and verification.
    pub jwt: Arc<JwtService>,
    /// TTL cache for assistant replies, keyed on the conversation.
    pub chat_cache: Arc<ResponseCache>,
    /// Base URL used when building verification/reset links in emails.
    pub app_base_url: String,
    /// "postgres" or "memory"; surfaced by the health endpoint.
    pub backend: &'static str,
}
