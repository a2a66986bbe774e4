//! Typed ID definitions for all domain entities.
//!
//! Type aliases over [`Id`] give compile-time safety for ID usage throughout
//! the application: a `UserId` cannot be passed where a `ChildId` is expected.

// Re-export the core Id type and version markers
pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (parent or admin accounts).
pub struct User;

/// Marker type for Child entities (athletes registered by a parent).
pub struct Child;

/// Marker type for Injury entities.
pub struct Injury;

/// Marker type for stored upload files.
pub struct Upload;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Child entities.
pub type ChildId = Id<Child>;

/// Typed ID for Injury entities.
pub type InjuryId = Id<Injury>;

/// Typed ID for uploaded files. Random rather than time-ordered so public
/// upload URLs do not reveal upload order.
pub type UploadId = Id<Upload, V4>;
