//! Kernel module - server infrastructure and dependencies.

pub mod assistant;
pub mod deps;
pub mod image_store;
pub mod mailer;
pub mod memory;
pub mod pg;
pub mod response_cache;
pub mod traits;

pub use deps::ServerDeps;
pub use traits::{
    BaseAssistant, BaseChildStore, BaseImageStore, BaseInjuryStore, BaseMailer, BaseUserStore,
    ChatMessage,
};
