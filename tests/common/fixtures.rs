//! Seed helpers writing straight into the in-memory database.

use nextplay_core::common::auth::Role;
use nextplay_core::common::{ChildId, UserId};
use nextplay_core::domains::auth::password;
use nextplay_core::domains::children::models::{Child, ChildInput};
use nextplay_core::domains::injuries::models::{Injury, NewInjury, Severity};
use nextplay_core::domains::users::models::User;

use crate::common::TestHarness;

pub const TEST_PASSWORD: &str = "correct horse battery";

fn seed_user(harness: &TestHarness, email: &str, role: Role, verified: bool) -> User {
    let hash = password::hash_password(TEST_PASSWORD).expect("hashing failed");
    let mut user = User::new_parent("Test User".to_string(), email.to_string(), hash);
    user.role = role;
    user.is_email_verified = verified;
    harness
        .backend
        .db
        .lock()
        .unwrap()
        .users
        .insert(user.id, user.clone());
    user
}

/// A verified parent who can log in.
pub fn seed_parent(harness: &TestHarness, email: &str) -> User {
    seed_user(harness, email, Role::Parent, true)
}

/// A parent who has not clicked the verification link yet.
pub fn seed_unverified_parent(harness: &TestHarness, email: &str) -> User {
    seed_user(harness, email, Role::Parent, false)
}

pub fn seed_admin(harness: &TestHarness, email: &str) -> User {
    seed_user(harness, email, Role::Admin, true)
}

pub fn seed_child(harness: &TestHarness, parent: UserId, name: &str) -> Child {
    let child = Child::new(
        ChildInput {
            name: name.to_string(),
            age: 11,
            gender: None,
            sport: Some("Soccer".to_string()),
            notes: None,
        },
        parent,
    );
    harness
        .backend
        .db
        .lock()
        .unwrap()
        .children
        .insert(child.id, child.clone());
    child
}

pub fn seed_injury(harness: &TestHarness, child: ChildId, kind: &str) -> Injury {
    let injury = Injury::new(
        NewInjury {
            child_id: child.to_string(),
            kind: kind.to_string(),
            description: "Hurt during practice".to_string(),
            date: None,
            location: "Left side".to_string(),
            severity: Severity::Moderate,
            photos: None,
            notes: None,
            suggested_timeline_days: None,
        },
        child,
    );
    harness
        .backend
        .db
        .lock()
        .unwrap()
        .injuries
        .insert(injury.id, injury.clone());
    injury
}

/// Flip a user's stored role after their token was issued.
pub fn change_role(harness: &TestHarness, user: UserId, role: Role) {
    harness
        .backend
        .db
        .lock()
        .unwrap()
        .users
        .get_mut(&user)
        .expect("user not seeded")
        .role = role;
}
