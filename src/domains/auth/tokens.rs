//! One-time tokens for email verification and password reset.
//!
//! The raw token goes into the emailed link; only the SHA-256 digest is
//! stored, so a database read never yields a usable token.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A freshly minted one-time token. `token` is emailed, `digest` is stored.
pub struct IssuedToken {
    pub token: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

pub fn issue(ttl: Duration) -> IssuedToken {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    IssuedToken {
        digest: digest_of(&token),
        token,
        expires_at: Utc::now() + ttl,
    }
}

/// Digest of a presented token, for lookup against the stored column.
pub fn digest_of(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_matches_issued_token() {
        let issued = issue(Duration::hours(24));
        assert_eq!(digest_of(&issued.token), issued.digest);
        assert_ne!(issued.token, issued.digest);
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(issue(Duration::hours(1)).token, issue(Duration::hours(1)).token);
    }

    #[test]
    fn test_expiry_honors_ttl() {
        let issued = issue(Duration::hours(1));
        let delta = issued.expires_at - Utc::now();
        assert!(delta <= Duration::hours(1));
        assert!(delta > Duration::minutes(59));
    }
}
