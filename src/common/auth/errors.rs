use thiserror::Error;

/// Authorization errors.
///
/// All three taxonomy variants are terminal for the request; none are retried.
/// "Doesn't exist" and "exists but not yours" collapse into the same
/// `NotFound` for non-owning parents so valid record ids never leak.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing, malformed, or expired credential - or the identity behind a
    /// valid credential no longer exists in storage.
    #[error("Unauthorized")]
    Unauthenticated,

    /// Authenticated, but role/ownership rules forbid the action.
    #[error("{0}")]
    Forbidden(String),

    /// Resource does not exist, or belongs to someone else and the requester
    /// is a non-admin.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Storage lookup failed. A failed lookup is a definitive deny, not a
    /// transient condition to retry.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
