//! Authorization core for Next Play Recovery.
//!
//! Provides a fluent API for authorization checks in route handlers:
//!
//! ```ignore
//! use crate::common::auth::{Access, Gate};
//!
//! // In a handler:
//! let actor = Gate::new(&deps).resolve(auth_user_id).await?;
//! let child = actor.can(Access::Update).child(child_id, &deps).await?;
//! ```
//!
//! `resolve` re-reads the user's role from storage on every request. The role
//! embedded in the session token is a snapshot taken at login and must never
//! drive an authorization decision: a demoted admin keeps a valid token for up
//! to seven days, and a promoted parent would otherwise have to log in again.

mod decision;
mod errors;
mod guard;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use decision::{AccessCheck, Actor, Gate};
pub use errors::AuthError;
pub use guard::{evaluate, Access, Decision, Resource};

/// Account role. Stored on the user record; mutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Role::Parent),
            "admin" => Ok(Role::Admin),
            other => Err(anyhow::anyhow!("unknown role: {other}")),
        }
    }
}
