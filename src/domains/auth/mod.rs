//! Auth domain: sessions, password hashing, one-time tokens and the
//! register/login/verify/reset flows.

pub mod actions;
pub mod jwt;
pub mod password;
pub mod tokens;

pub use actions::AuthFlowError;
pub use jwt::{Claims, JwtService, TOKEN_TTL_SECONDS};
