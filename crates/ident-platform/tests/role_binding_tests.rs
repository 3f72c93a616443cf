//! Role Binding Integration Tests
//!
//! Tests for:
//! - Aggregate role type after create / update_role / delete
//! - Scope compatibility between resource group and role type
//! - Duplicate detection
//! - Workspace scope of the caller
//! - list and stat
//! - Events and audit entries written with each mutation

mod common;

use common::*;
use ident_platform::role::{Role, RoleType};
use ident_platform::role_binding::{
    ResourceGroup, RoleBinding, RoleBindingQuery, StatField, UpdateRoleRequest, ALL_WORKSPACES,
};
use ident_platform::shared::Page;
use ident_platform::user::User;

fn update(role_binding_id: &str, role_id: &str) -> UpdateRoleRequest {
    UpdateRoleRequest {
        role_binding_id: role_binding_id.to_string(),
        role_id: role_id.to_string(),
    }
}

#[tokio::test]
async fn test_domain_admin_binding_elevates_user() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));

    let binding = t
        .platform
        .role_bindings
        .create(Some(domain_admin()), domain_binding("u", "role-admin"))
        .await
        .unwrap();

    assert_eq!(binding.workspace_id, ALL_WORKSPACES);
    assert_eq!(binding.role_type, RoleType::DomainAdmin);
    assert_eq!(t.user("u").role_type, RoleType::DomainAdmin);
}

#[tokio::test]
async fn test_domain_binding_ignores_requested_workspace() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));

    let mut request = domain_binding("u", "role-admin");
    request.workspace_id = Some("ws-1".to_string());
    let binding = t
        .platform
        .role_bindings
        .create(Some(domain_admin()), request)
        .await
        .unwrap();

    assert_eq!(binding.workspace_id, ALL_WORKSPACES);
}

#[tokio::test]
async fn test_workspace_owner_binding_keeps_user_role() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));

    let binding = t
        .platform
        .role_bindings
        .create(Some(domain_admin()), workspace_binding("u", "role-owner", "ws-1"))
        .await
        .unwrap();

    assert_eq!(binding.role_type, RoleType::WorkspaceOwner);
    assert_eq!(t.user("u").role_type, RoleType::User);
}

#[tokio::test]
async fn test_domain_binding_with_workspace_role_is_rejected() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));

    for role_id in ["role-owner", "role-member", "role-user"] {
        let err = t
            .platform
            .role_bindings
            .create(Some(domain_admin()), domain_binding("u", role_id))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "NOT_ALLOWED_ROLE_TYPE");
        assert_eq!(
            err.details().get("supported_role_type"),
            Some(&serde_json::json!(["DOMAIN_ADMIN"]))
        );
    }

    assert_eq!(t.user("u").role_type, RoleType::User);
    assert!(t.bindings_of("u").is_empty());
    assert!(t.backend.events().is_empty());
}

#[tokio::test]
async fn test_workspace_binding_with_admin_role_is_rejected() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));

    let err = t
        .platform
        .role_bindings
        .create(Some(domain_admin()), workspace_binding("u", "role-admin", "ws-1"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "NOT_ALLOWED_ROLE_TYPE");
    assert_eq!(
        err.details().get("supported_role_type"),
        Some(&serde_json::json!(["WORKSPACE_OWNER", "WORKSPACE_MEMBER"]))
    );
    assert!(t.bindings_of("u").is_empty());
}

#[tokio::test]
async fn test_create_reports_missing_records() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let err = rb
        .create(Some(domain_admin()), domain_binding("ghost", "role-admin"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "USER_NOT_FOUND");

    let err = rb
        .create(Some(domain_admin()), workspace_binding("u", "role-owner", "ws-9"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "WORKSPACE_NOT_FOUND");

    let err = rb
        .create(Some(domain_admin()), domain_binding("u", "role-missing"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_NOT_FOUND");

    // Roles of another domain are invisible
    let err = rb
        .create(Some(domain_admin()), domain_binding("u", "role-foreign"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_NOT_FOUND");

    let mut request = workspace_binding("u", "role-owner", "ws-1");
    request.workspace_id = None;
    let err = rb.create(Some(domain_admin()), request).await.unwrap_err();
    assert_eq!(err.code(), "REQUIRED_PARAMETER");
}

#[tokio::test]
async fn test_duplicate_binding_is_rejected() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    rb.create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap();
    let err = rb
        .create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ROLE_BINDING_ALREADY_EXISTS");
    assert_eq!(t.bindings_of("u").len(), 1);

    // Same role in another workspace is a different binding
    rb.create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-2"))
        .await
        .unwrap();
    assert_eq!(t.bindings_of("u").len(), 2);
}

#[tokio::test]
async fn test_deleting_last_binding_resets_user() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let binding = rb
        .create(Some(domain_admin()), domain_binding("u", "role-admin"))
        .await
        .unwrap();
    rb.delete(Some(domain_admin()), &binding.role_binding_id)
        .await
        .unwrap();

    assert_eq!(t.user("u").role_type, RoleType::User);
    assert!(t.bindings_of("u").is_empty());
}

#[tokio::test]
async fn test_admin_then_member_then_delete_admin() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let admin = rb
        .create(Some(domain_admin()), domain_binding("u", "role-admin"))
        .await
        .unwrap();
    assert_eq!(t.user("u").role_type, RoleType::DomainAdmin);

    rb.create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap();
    assert_eq!(t.user("u").role_type, RoleType::DomainAdmin);

    rb.delete(Some(domain_admin()), &admin.role_binding_id)
        .await
        .unwrap();

    // Recomputed over the member binding alone, which collapses to USER
    assert_eq!(t.user("u").role_type, RoleType::User);
    assert_eq!(t.bindings_of("u").len(), 1);
}

#[tokio::test]
async fn test_delete_keeps_remaining_admin_binding() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let first = rb
        .create(Some(domain_admin()), domain_binding("u", "role-admin"))
        .await
        .unwrap();
    rb.create(Some(domain_admin()), domain_binding("u", "role-admin-2"))
        .await
        .unwrap();
    rb.delete(Some(domain_admin()), &first.role_binding_id)
        .await
        .unwrap();

    assert_eq!(t.user("u").role_type, RoleType::DomainAdmin);
}

#[tokio::test]
async fn test_system_admin_keeps_role_type() {
    let t = TestPlatform::new();
    t.add_user(User::new("root", DOMAIN).with_role_type(RoleType::SystemAdmin));
    let rb = &t.platform.role_bindings;

    let binding = rb
        .create(Some(domain_admin()), workspace_binding("root", "role-member", "ws-1"))
        .await
        .unwrap();
    assert_eq!(t.user("root").role_type, RoleType::SystemAdmin);

    rb.delete(Some(domain_admin()), &binding.role_binding_id)
        .await
        .unwrap();
    assert_eq!(t.user("root").role_type, RoleType::SystemAdmin);
}

#[tokio::test]
async fn test_update_role_between_workspace_roles() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let binding = rb
        .create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap();
    let changed = rb
        .update_role(
            Some(domain_admin()),
            update(&binding.role_binding_id, "role-owner"),
        )
        .await
        .unwrap();

    assert_eq!(changed.role_binding_id, binding.role_binding_id);
    assert_eq!(changed.role_id, "role-owner");
    assert_eq!(changed.role_type, RoleType::WorkspaceOwner);
    assert_eq!(changed.workspace_id, "ws-1");
    assert_eq!(t.user("u").role_type, RoleType::User);
}

#[tokio::test]
async fn test_update_role_onto_existing_binding_is_rejected() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let member = rb
        .create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap();
    rb.create(Some(domain_admin()), workspace_binding("u", "role-owner", "ws-1"))
        .await
        .unwrap();

    let err = rb
        .update_role(Some(domain_admin()), update(&member.role_binding_id, "role-owner"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_BINDING_ALREADY_EXISTS");
    assert_eq!(t.backend.events().len(), 2);

    let query = RoleBindingQuery {
        role_binding_id: Some(member.role_binding_id.clone()),
        ..RoleBindingQuery::default()
    };
    let page = rb.list(Some(domain_admin()), query).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.results[0].role_id, "role-member");

    // Re-pointing onto its own role is not a duplicate
    rb.update_role(Some(domain_admin()), update(&member.role_binding_id, "role-member"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_role_keeps_admin_bindings_admin() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let admin = rb
        .create(Some(domain_admin()), domain_binding("u", "role-admin"))
        .await
        .unwrap();

    let err = rb
        .update_role(Some(domain_admin()), update(&admin.role_binding_id, "role-owner"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_ALLOWED_ROLE_TYPE");

    let changed = rb
        .update_role(Some(domain_admin()), update(&admin.role_binding_id, "role-admin-2"))
        .await
        .unwrap();
    assert_eq!(changed.role_id, "role-admin-2");
    assert_eq!(t.user("u").role_type, RoleType::DomainAdmin);

    let member = rb
        .create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap();
    let err = rb
        .update_role(Some(domain_admin()), update(&member.role_binding_id, "role-admin"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_ALLOWED_ROLE_TYPE");
}

#[tokio::test]
async fn test_update_role_reports_missing_records() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let err = rb
        .update_role(Some(domain_admin()), update("rb-missing", "role-owner"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_BINDING_NOT_FOUND");

    let binding = rb
        .create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap();
    let err = rb
        .update_role(Some(domain_admin()), update(&binding.role_binding_id, "role-missing"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_NOT_FOUND");
}

#[tokio::test]
async fn test_delete_and_get_unknown_binding() {
    let t = TestPlatform::new();
    let rb = &t.platform.role_bindings;

    let err = rb.delete(Some(domain_admin()), "rb-missing").await.unwrap_err();
    assert_eq!(err.code(), "ROLE_BINDING_NOT_FOUND");

    let err = rb.get(Some(domain_admin()), "rb-missing").await.unwrap_err();
    assert_eq!(err.code(), "ROLE_BINDING_NOT_FOUND");
}

#[tokio::test]
async fn test_delete_binding_of_missing_user_is_rejected() {
    let t = TestPlatform::new();
    let role = Role::new("role-admin", "Administrator", RoleType::DomainAdmin, DOMAIN);
    let orphan = RoleBinding::new("ghost", &role, ResourceGroup::Domain, ALL_WORKSPACES);
    t.backend.insert(&orphan).unwrap();

    let err = t
        .platform
        .role_bindings
        .delete(Some(domain_admin()), &orphan.role_binding_id)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "USER_NOT_FOUND");
    assert_eq!(t.bindings_of("ghost").len(), 1);
    assert!(t.backend.events().is_empty());
    assert!(t.backend.audit_logs().is_empty());
}

#[tokio::test]
async fn test_workspace_owner_sees_only_own_workspaces() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let in_scope = rb
        .create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap();
    let out_of_scope = rb
        .create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-2"))
        .await
        .unwrap();
    let owner = workspace_owner(&["ws-1"]);

    assert!(rb.get(Some(owner.clone()), &in_scope.role_binding_id).await.is_success());

    let err = rb
        .get(Some(owner.clone()), &out_of_scope.role_binding_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_BINDING_NOT_FOUND");

    let err = rb
        .update_role(Some(owner.clone()), update(&out_of_scope.role_binding_id, "role-owner"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_BINDING_NOT_FOUND");

    let err = rb
        .delete(Some(owner.clone()), &out_of_scope.role_binding_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_BINDING_NOT_FOUND");
    assert_eq!(t.bindings_of("u").len(), 2);

    let page = rb.list(Some(owner), RoleBindingQuery::default()).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.results[0].role_binding_id, in_scope.role_binding_id);
}

#[tokio::test]
async fn test_workspace_owner_cannot_bind_outside_scope() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;
    let owner = workspace_owner(&["ws-1"]);

    let err = rb
        .create(Some(owner.clone()), workspace_binding("u", "role-member", "ws-2"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    let err = rb
        .create(Some(owner.clone()), domain_binding("u", "role-admin"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");
    assert_eq!(t.user("u").role_type, RoleType::User);

    assert!(rb
        .create(Some(owner), workspace_binding("u", "role-member", "ws-1"))
        .await
        .is_success());
}

#[tokio::test]
async fn test_list_filters_keyword_and_page() {
    let t = TestPlatform::new();
    for user_id in ["alice", "bob", "carol"] {
        t.add_user(User::new(user_id, DOMAIN));
    }
    let rb = &t.platform.role_bindings;
    for user_id in ["alice", "bob", "carol"] {
        rb.create(Some(domain_admin()), workspace_binding(user_id, "role-member", "ws-1"))
            .await
            .unwrap();
    }
    rb.create(Some(domain_admin()), domain_binding("alice", "role-admin"))
        .await
        .unwrap();

    let by_keyword = RoleBindingQuery {
        keyword: Some("ali".to_string()),
        ..RoleBindingQuery::default()
    };
    let page = rb.list(Some(domain_admin()), by_keyword).await.unwrap();
    assert_eq!(page.total_count, 2);
    assert!(page.results.iter().all(|b| b.user_id == "alice"));

    let mut paged_users = Vec::new();
    for start in 0..4 {
        let by_type = RoleBindingQuery {
            role_type: Some(RoleType::WorkspaceMember),
            page: Page::new(start, 1),
            ..RoleBindingQuery::default()
        };
        let page = rb.list(Some(domain_admin()), by_type).await.unwrap();
        assert_eq!(page.total_count, 3);
        paged_users.extend(page.results.into_iter().map(|b| b.user_id));
    }
    paged_users.sort();
    assert_eq!(paged_users, vec!["alice", "bob", "carol"]);
}

#[tokio::test]
async fn test_stat_groups_matching_bindings() {
    let t = TestPlatform::new();
    for user_id in ["alice", "bob"] {
        t.add_user(User::new(user_id, DOMAIN));
    }
    let rb = &t.platform.role_bindings;
    rb.create(Some(domain_admin()), workspace_binding("alice", "role-member", "ws-1"))
        .await
        .unwrap();
    rb.create(Some(domain_admin()), workspace_binding("bob", "role-member", "ws-1"))
        .await
        .unwrap();
    rb.create(Some(domain_admin()), workspace_binding("bob", "role-owner", "ws-2"))
        .await
        .unwrap();

    let stat = rb
        .stat(Some(domain_admin()), RoleBindingQuery::default(), StatField::WorkspaceId)
        .await
        .unwrap();
    assert_eq!(stat.total_count, 3);
    assert_eq!(stat.results[0].key, "ws-1");
    assert_eq!(stat.results[0].count, 2);

    let stat = rb
        .stat(Some(workspace_owner(&["ws-2"])), RoleBindingQuery::default(), StatField::RoleType)
        .await
        .unwrap();
    assert_eq!(stat.total_count, 1);
    assert_eq!(stat.results[0].key, "WORKSPACE_OWNER");
}

#[tokio::test]
async fn test_each_mutation_writes_event_and_audit() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let binding = rb
        .create(Some(domain_admin()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap();
    rb.update_role(Some(domain_admin()), update(&binding.role_binding_id, "role-owner"))
        .await
        .unwrap();
    rb.delete(Some(domain_admin()), &binding.role_binding_id)
        .await
        .unwrap();

    assert_eq!(
        t.event_types(),
        vec![
            "identity:role_binding:created",
            "identity:role_binding:role_changed",
            "identity:role_binding:deleted",
        ]
    );

    let audit = t.backend.audit_logs();
    let operations: Vec<&str> = audit.iter().map(|a| a.operation.as_str()).collect();
    assert_eq!(
        operations,
        vec!["CreateRoleBindingCommand", "ChangeRoleCommand", "DeleteRoleBindingCommand"]
    );
    assert!(audit.iter().all(|a| a.principal_id == "admin"));
    assert!(audit.iter().all(|a| a.entity_type == "RoleBinding"));
}
