//! Shared types used across domains.

pub mod auth;
pub mod entity_ids;
pub mod id;

pub use entity_ids::*;
pub use id::{Id, V4, V7};
