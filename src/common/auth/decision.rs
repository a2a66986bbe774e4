//! Decision combinator: credential -> live identity -> ownership guard.
//!
//! Handlers never piece these steps together by hand. The only path is
//! `Gate::resolve` followed by `Actor::can(..)`, which guarantees the
//! ordering (resolve before guard) and the uniform error mapping.

use super::errors::AuthError;
use super::guard::{self, Access, Decision, Resource};
use super::Role;
use crate::common::{ChildId, InjuryId, UserId};
use crate::domains::children::models::Child;
use crate::domains::injuries::models::Injury;
use crate::kernel::ServerDeps;

/// Entry point for resolving the requesting identity.
pub struct Gate<'a> {
    deps: &'a ServerDeps,
}

impl<'a> Gate<'a> {
    pub fn new(deps: &'a ServerDeps) -> Self {
        Self { deps }
    }

    /// Resolve a verified credential into a live actor.
    ///
    /// The role comes from the user record as it exists right now, never
    /// from the token. A token whose user has been deleted resolves to
    /// `Unauthenticated`, exactly as if no credential had been presented.
    pub async fn resolve(&self, user_id: Option<UserId>) -> Result<Actor, AuthError> {
        let user_id = user_id.ok_or(AuthError::Unauthenticated)?;
        let user = self
            .deps
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;
        Ok(Actor {
            id: user.id,
            role: user.role,
        })
    }
}

/// A resolved identity: who is asking, with their current role.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admin-only surface (stats, user listings, exports).
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Parent-only operations (creating records). `action` completes the
    /// denial message, e.g. "create injuries".
    pub fn require_parent(&self, action: &str) -> Result<(), AuthError> {
        if self.is_admin() {
            Err(AuthError::Forbidden(format!("Only parents can {action}")))
        } else {
            Ok(())
        }
    }

    /// Start an ownership-guarded access to a specific record.
    pub fn can(&self, access: Access) -> AccessCheck {
        AccessCheck {
            actor: *self,
            access,
        }
    }
}

/// A pending access, waiting to be pointed at a record.
pub struct AccessCheck {
    actor: Actor,
    access: Access,
}

impl AccessCheck {
    /// Load the child and apply the guard. Returns the record on Allow.
    pub async fn child(self, id: ChildId, deps: &ServerDeps) -> Result<Child, AuthError> {
        let child = deps
            .children
            .find_by_id(id)
            .await?
            .ok_or(AuthError::NotFound(Resource::Child.name()))?;

        self.apply(child.parent.id(), Resource::Child)?;
        Ok(child)
    }

    /// Load the injury, resolve its owner through the child, and apply the
    /// guard. Returns the record on Allow.
    ///
    /// Ownership of an injury is transitive: the injury names a child, the
    /// child names the parent. When the loaded injury carries only a bare
    /// child id the child row is fetched for its parent edge. An injury
    /// whose child has vanished is treated as not found.
    pub async fn injury(self, id: InjuryId, deps: &ServerDeps) -> Result<Injury, AuthError> {
        let injury = deps
            .injuries
            .find_by_id(id)
            .await?
            .ok_or(AuthError::NotFound(Resource::Injury.name()))?;

        let owner = match injury.child.owner() {
            Some(owner) => owner,
            None => deps
                .children
                .find_by_id(injury.child.id())
                .await?
                .map(|child| child.parent.id())
                .ok_or(AuthError::NotFound(Resource::Injury.name()))?,
        };

        self.apply(owner, Resource::Injury)?;
        Ok(injury)
    }

    fn apply(&self, owner: UserId, resource: Resource) -> Result<(), AuthError> {
        match guard::evaluate(self.actor.role, self.actor.id, owner, self.access, resource) {
            Decision::Allow => Ok(()),
            Decision::DenyNotFound => Err(AuthError::NotFound(resource.name())),
            Decision::DenyForbidden(message) => Err(AuthError::Forbidden(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::children::models::ChildInput;
    use crate::domains::injuries::models::NewInjury;
    use crate::domains::users::models::User;
    use crate::kernel::memory::{memory_deps, MemoryBackend};

    fn backend() -> MemoryBackend {
        memory_deps("test-secret", "test", "http://localhost:3000")
    }

    fn seed_user(backend: &MemoryBackend, role: Role) -> UserId {
        let mut user = User::new_parent(
            "Someone".to_string(),
            format!("{}@example.com", UserId::new()),
            "hash".to_string(),
        );
        user.role = role;
        let id = user.id;
        backend.db.lock().unwrap().users.insert(id, user);
        id
    }

    fn seed_child(backend: &MemoryBackend, parent: UserId) -> ChildId {
        let child = Child::new(
            ChildInput {
                name: "Sam".to_string(),
                age: 10,
                gender: None,
                sport: None,
                notes: None,
            },
            parent,
        );
        let id = child.id;
        backend.db.lock().unwrap().children.insert(id, child);
        id
    }

    fn seed_injury(backend: &MemoryBackend, child: ChildId) -> InjuryId {
        let injury = Injury::new(
            NewInjury {
                child_id: child.to_string(),
                kind: "Ankle Sprain".to_string(),
                description: "Rolled ankle at practice".to_string(),
                date: None,
                location: "Left ankle".to_string(),
                severity: crate::domains::injuries::models::Severity::Mild,
                photos: None,
                notes: None,
                suggested_timeline_days: None,
            },
            child,
        );
        let id = injury.id;
        backend.db.lock().unwrap().injuries.insert(id, injury);
        id
    }

    #[tokio::test]
    async fn test_resolve_without_credential_is_unauthenticated() {
        let backend = backend();
        let result = Gate::new(&backend.deps).resolve(None).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_resolve_deleted_user_is_unauthenticated() {
        let backend = backend();
        let result = Gate::new(&backend.deps).resolve(Some(UserId::new())).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_resolve_uses_live_role_not_snapshot() {
        let backend = backend();
        let id = seed_user(&backend, Role::Parent);

        // Role changes in storage after the session token was issued.
        backend.db.lock().unwrap().users.get_mut(&id).unwrap().role = Role::Admin;

        let actor = Gate::new(&backend.deps).resolve(Some(id)).await.unwrap();
        assert!(actor.is_admin());
    }

    #[tokio::test]
    async fn test_owner_parent_full_access() {
        let backend = backend();
        let parent = seed_user(&backend, Role::Parent);
        let child_id = seed_child(&backend, parent);
        let actor = Gate::new(&backend.deps).resolve(Some(parent)).await.unwrap();

        for access in [Access::Read, Access::Update, Access::Delete] {
            let child = actor.can(access).child(child_id, &backend.deps).await;
            assert!(child.is_ok(), "owner should be allowed to {access:?}");
        }
    }

    #[tokio::test]
    async fn test_non_owner_parent_gets_not_found() {
        let backend = backend();
        let owner = seed_user(&backend, Role::Parent);
        let stranger = seed_user(&backend, Role::Parent);
        let child_id = seed_child(&backend, owner);
        let actor = Gate::new(&backend.deps)
            .resolve(Some(stranger))
            .await
            .unwrap();

        let result = actor.can(Access::Read).child(child_id, &backend.deps).await;
        assert!(matches!(result, Err(AuthError::NotFound("Child"))));
    }

    #[tokio::test]
    async fn test_admin_reads_but_cannot_write() {
        let backend = backend();
        let owner = seed_user(&backend, Role::Parent);
        let admin = seed_user(&backend, Role::Admin);
        let child_id = seed_child(&backend, owner);
        let actor = Gate::new(&backend.deps).resolve(Some(admin)).await.unwrap();

        assert!(actor
            .can(Access::Read)
            .child(child_id, &backend.deps)
            .await
            .is_ok());

        let denied = actor
            .can(Access::Update)
            .child(child_id, &backend.deps)
            .await;
        match denied {
            Err(AuthError::Forbidden(message)) => {
                assert_eq!(message, "Admins cannot edit children");
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_admin_sees_real_not_found() {
        let backend = backend();
        let admin = seed_user(&backend, Role::Admin);
        let actor = Gate::new(&backend.deps).resolve(Some(admin)).await.unwrap();

        let result = actor
            .can(Access::Read)
            .child(ChildId::new(), &backend.deps)
            .await;
        assert!(matches!(result, Err(AuthError::NotFound("Child"))));
    }

    #[tokio::test]
    async fn test_injury_ownership_is_transitive() {
        let backend = backend();
        let owner = seed_user(&backend, Role::Parent);
        let stranger = seed_user(&backend, Role::Parent);
        let child_id = seed_child(&backend, owner);
        let injury_id = seed_injury(&backend, child_id);

        let owner_actor = Gate::new(&backend.deps).resolve(Some(owner)).await.unwrap();
        assert!(owner_actor
            .can(Access::Update)
            .injury(injury_id, &backend.deps)
            .await
            .is_ok());

        let stranger_actor = Gate::new(&backend.deps)
            .resolve(Some(stranger))
            .await
            .unwrap();
        let result = stranger_actor
            .can(Access::Read)
            .injury(injury_id, &backend.deps)
            .await;
        assert!(matches!(result, Err(AuthError::NotFound("Injury"))));
    }

    #[tokio::test]
    async fn test_injury_with_missing_child_is_not_found() {
        let backend = backend();
        let parent = seed_user(&backend, Role::Parent);
        let child_id = seed_child(&backend, parent);
        let injury_id = seed_injury(&backend, child_id);
        backend.db.lock().unwrap().children.remove(&child_id);

        let actor = Gate::new(&backend.deps).resolve(Some(parent)).await.unwrap();
        let result = actor
            .can(Access::Read)
            .injury(injury_id, &backend.deps)
            .await;
        assert!(matches!(result, Err(AuthError::NotFound("Injury"))));
    }

    #[tokio::test]
    async fn test_role_gates() {
        let backend = backend();
        let parent = seed_user(&backend, Role::Parent);
        let admin = seed_user(&backend, Role::Admin);

        let parent_actor = Gate::new(&backend.deps).resolve(Some(parent)).await.unwrap();
        let admin_actor = Gate::new(&backend.deps).resolve(Some(admin)).await.unwrap();

        assert!(parent_actor.require_admin().is_err());
        assert!(admin_actor.require_admin().is_ok());

        assert!(parent_actor.require_parent("create injuries").is_ok());
        match admin_actor.require_parent("create injuries") {
            Err(AuthError::Forbidden(message)) => {
                assert_eq!(message, "Only parents can create injuries");
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }
}
