//! Authenticated caller and the scope an operation may touch

use std::collections::HashSet;

use crate::role::RoleType;
use crate::role_binding::WorkspaceScope;

/// Permission strings take the form `{service}:{Resource}.{verb}`,
/// e.g. `identity:RoleBinding.write`.
pub mod permissions {
    pub const ALL: &str = "*";

    pub const ROLE_BINDING_READ: &str = "identity:RoleBinding.read";
    pub const ROLE_BINDING_WRITE: &str = "identity:RoleBinding.write";
    pub const USER_PROFILE_READ: &str = "identity:UserProfile.read";
    pub const USER_PROFILE_WRITE: &str = "identity:UserProfile.write";
}

/// Authenticated principal, as resolved by the transport layer.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub domain_id: String,
    pub role_type: RoleType,
    /// Workspaces the caller holds a binding in
    pub workspace_ids: Vec<String>,
    pub permissions: HashSet<String>,
    /// Forwarded request id, carried into event metadata
    pub correlation_id: Option<String>,
}

impl Caller {
    pub fn new(
        user_id: impl Into<String>,
        domain_id: impl Into<String>,
        role_type: RoleType,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            domain_id: domain_id.into(),
            role_type,
            workspace_ids: Vec::new(),
            permissions: HashSet::new(),
            correlation_id: None,
        }
    }

    pub fn with_workspaces<I, S>(mut self, workspace_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workspace_ids = workspace_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Check a permission, honouring `*`, `{service}:*` and
    /// `{service}:{Resource}.*` grants.
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.permissions.contains(permission) || self.permissions.contains(permissions::ALL) {
            return true;
        }

        if let Some((service, rest)) = permission.split_once(':') {
            if self.permissions.contains(&format!("{}:*", service)) {
                return true;
            }
            if let Some((resource, _verb)) = rest.split_once('.') {
                if self
                    .permissions
                    .contains(&format!("{}:{}.*", service, resource))
                {
                    return true;
                }
            }
        }

        false
    }

    /// Workspaces this caller may act on.
    pub fn workspace_scope(&self) -> WorkspaceScope {
        if self.role_type == RoleType::DomainAdmin || self.role_type.is_system() {
            WorkspaceScope::All
        } else {
            WorkspaceScope::Only(self.workspace_ids.clone())
        }
    }
}

/// What an operation is allowed to touch, derived from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestScope {
    pub domain_id: String,
    pub user_id: String,
    pub workspace_scope: WorkspaceScope,
}

impl RequestScope {
    pub fn for_caller(caller: &Caller) -> Self {
        Self {
            domain_id: caller.domain_id.clone(),
            user_id: caller.user_id.clone(),
            workspace_scope: caller.workspace_scope(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_wildcards() {
        let exact = Caller::new("alice", "d-1", RoleType::User)
            .with_permissions([permissions::ROLE_BINDING_READ]);
        assert!(exact.has_permission(permissions::ROLE_BINDING_READ));
        assert!(!exact.has_permission(permissions::ROLE_BINDING_WRITE));

        let resource = Caller::new("alice", "d-1", RoleType::User)
            .with_permissions(["identity:RoleBinding.*"]);
        assert!(resource.has_permission(permissions::ROLE_BINDING_WRITE));
        assert!(!resource.has_permission(permissions::USER_PROFILE_WRITE));

        let service =
            Caller::new("alice", "d-1", RoleType::User).with_permissions(["identity:*"]);
        assert!(service.has_permission(permissions::USER_PROFILE_WRITE));
        assert!(!service.has_permission("inventory:Server.read"));

        let root = Caller::new("root", "d-1", RoleType::System).with_permissions(["*"]);
        assert!(root.has_permission("inventory:Server.read"));
    }

    #[test]
    fn test_workspace_scope_by_role_type() {
        let admin = Caller::new("a", "d-1", RoleType::DomainAdmin).with_workspaces(["ws-1"]);
        assert_eq!(admin.workspace_scope(), WorkspaceScope::All);

        let system = Caller::new("s", "d-1", RoleType::SystemAdmin);
        assert_eq!(system.workspace_scope(), WorkspaceScope::All);

        let owner = Caller::new("o", "d-1", RoleType::WorkspaceOwner).with_workspaces(["ws-1"]);
        assert_eq!(
            owner.workspace_scope(),
            WorkspaceScope::Only(vec!["ws-1".to_string()])
        );
    }
}
