//! Resource ownership guard.
//!
//! Pure decision tables: given the live role, the requesting user, and the
//! resolved owner of the target record, decide whether the request proceeds.
//! Loading records and resolving transitive ownership happens in
//! [`decision`](super::decision); nothing here touches storage.

use super::Role;
use crate::common::UserId;

/// What the request wants to do with the resource.
///
/// Update and Delete are kept distinct so denial messages can name the
/// operation ("Admins cannot edit children" vs "Admins cannot delete
/// children"), matching the messages clients already display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Update,
    Delete,
}

impl Access {
    pub fn is_write(&self) -> bool {
        !matches!(self, Access::Read)
    }

    fn verb(&self) -> &'static str {
        match self {
            Access::Read => "view",
            Access::Update => "edit",
            Access::Delete => "delete",
        }
    }
}

/// Which kind of record is being guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Child,
    Injury,
}

impl Resource {
    /// Singular name used in "X not found" messages.
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Child => "Child",
            Resource::Injury => "Injury",
        }
    }

    fn plural(&self) -> &'static str {
        match self {
            Resource::Child => "children",
            Resource::Injury => "injuries",
        }
    }
}

/// Guard verdict for one request against one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Deliberately indistinguishable from a nonexistent record.
    DenyNotFound,
    DenyForbidden(String),
}

/// Apply the ownership decision tables.
///
/// | role   | owns | read          | write                    |
/// |--------|------|---------------|--------------------------|
/// | parent | yes  | Allow         | Allow                    |
/// | parent | no   | DenyNotFound  | DenyNotFound             |
/// | admin  | any  | Allow         | DenyForbidden            |
///
/// Admin read-everything/write-nothing is an intentional asymmetry: admins
/// monitor and export, they never alter another family's records.
pub fn evaluate(
    role: Role,
    requester: UserId,
    owner: UserId,
    access: Access,
    resource: Resource,
) -> Decision {
    match role {
        Role::Admin => {
            if access.is_write() {
                Decision::DenyForbidden(format!(
                    "Admins cannot {} {}",
                    access.verb(),
                    resource.plural()
                ))
            } else {
                Decision::Allow
            }
        }
        Role::Parent => {
            if requester == owner {
                Decision::Allow
            } else {
                Decision::DenyNotFound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (UserId, UserId) {
        (UserId::new(), UserId::new())
    }

    #[test]
    fn test_parent_reads_own_child() {
        let (owner, _) = ids();
        let decision = evaluate(Role::Parent, owner, owner, Access::Read, Resource::Child);
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_parent_writes_own_child() {
        let (owner, _) = ids();
        for access in [Access::Update, Access::Delete] {
            let decision = evaluate(Role::Parent, owner, owner, access, Resource::Child);
            assert_eq!(decision, Decision::Allow);
        }
    }

    #[test]
    fn test_non_owning_parent_gets_not_found_never_forbidden() {
        let (owner, stranger) = ids();
        for access in [Access::Read, Access::Update, Access::Delete] {
            let decision = evaluate(Role::Parent, stranger, owner, access, Resource::Child);
            assert_eq!(decision, Decision::DenyNotFound, "access: {access:?}");
        }
    }

    #[test]
    fn test_admin_reads_anything() {
        let (owner, admin) = ids();
        let decision = evaluate(Role::Admin, admin, owner, Access::Read, Resource::Injury);
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_admin_never_writes() {
        let (owner, admin) = ids();
        let decision = evaluate(Role::Admin, admin, owner, Access::Update, Resource::Child);
        assert_eq!(
            decision,
            Decision::DenyForbidden("Admins cannot edit children".to_string())
        );

        let decision = evaluate(Role::Admin, admin, owner, Access::Delete, Resource::Injury);
        assert_eq!(
            decision,
            Decision::DenyForbidden("Admins cannot delete injuries".to_string())
        );
    }

    #[test]
    fn test_admin_write_denied_even_for_own_records() {
        // A promoted parent keeps ownership edges but loses write access.
        let (owner, _) = ids();
        let decision = evaluate(Role::Admin, owner, owner, Access::Delete, Resource::Child);
        assert!(matches!(decision, Decision::DenyForbidden(_)));
    }
}
