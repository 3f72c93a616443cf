//! Handler Chain Integration Tests
//!
//! Tests for:
//! - Authentication and authorization through the service facades
//! - Domain scope taken from the caller
//! - Per-user serialisation of concurrent binding mutations
//! - Failed commits leaving nothing behind

mod common;

use futures::future::join_all;

use common::*;
use ident_platform::handler::{permissions, Caller};
use ident_platform::role::RoleType;
use ident_platform::role_binding::RoleBindingQuery;
use ident_platform::user::{MfaOptions, User};
use ident_platform::user_profile::EnableMfaRequest;

#[tokio::test]
async fn test_missing_caller_is_unauthenticated() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));

    let err = t
        .platform
        .role_bindings
        .create(None, domain_binding("u", "role-admin"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNAUTHENTICATED");

    let err = t.platform.user_profile.get(None).await.unwrap_err();
    assert_eq!(err.code(), "UNAUTHENTICATED");
    assert_eq!(t.user("u").role_type, RoleType::User);
}

#[tokio::test]
async fn test_member_cannot_write_bindings() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let member = Caller::new("m", DOMAIN, RoleType::WorkspaceMember)
        .with_workspaces(["ws-1"])
        .with_permissions([permissions::ALL]);
    let rb = &t.platform.role_bindings;

    let err = rb
        .create(Some(member.clone()), workspace_binding("u", "role-member", "ws-1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_ALLOWED_ROLE_SCOPE");

    // Members may read within their workspaces
    assert!(rb.list(Some(member), RoleBindingQuery::default()).await.is_success());
}

#[tokio::test]
async fn test_permission_is_required() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let reader = Caller::new("admin", DOMAIN, RoleType::DomainAdmin)
        .with_permissions([permissions::ROLE_BINDING_READ]);
    let err = rb
        .create(Some(reader.clone()), domain_binding("u", "role-admin"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");
    assert!(rb.list(Some(reader), RoleBindingQuery::default()).await.is_success());

    let wildcard = Caller::new("admin", DOMAIN, RoleType::DomainAdmin).with_permissions(["identity:*"]);
    assert!(rb
        .create(Some(wildcard), domain_binding("u", "role-admin"))
        .await
        .is_success());
}

#[tokio::test]
async fn test_system_caller_needs_no_grants() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));

    let system = Caller::new("platform", DOMAIN, RoleType::System);
    let binding = t
        .platform
        .role_bindings
        .create(Some(system), workspace_binding("u", "role-owner", "ws-2"))
        .await
        .unwrap();

    assert_eq!(binding.workspace_id, "ws-2");
}

#[tokio::test]
async fn test_domain_comes_from_caller() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));

    let foreign = Caller::new("admin", "d-2", RoleType::DomainAdmin)
        .with_permissions([permissions::ROLE_BINDING_WRITE]);
    let err = t
        .platform
        .role_bindings
        .create(Some(foreign), domain_binding("u", "role-admin"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "USER_NOT_FOUND");
    assert!(t.bindings_of("u").is_empty());
}

#[tokio::test]
async fn test_profile_operations_act_on_caller() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    t.add_user(User::new("v", DOMAIN));

    // Any role type reaches its own profile once it holds the grant
    let member = Caller::new("v", DOMAIN, RoleType::WorkspaceMember)
        .with_permissions([permissions::USER_PROFILE_READ]);
    let info = t.platform.user_profile.get(Some(member)).await.unwrap();
    assert_eq!(info.user_id, "v");
}

#[tokio::test]
async fn test_profile_operations_require_grant() {
    let t = TestPlatform::new();
    t.add_user(User::new("v", DOMAIN));
    let profile = &t.platform.user_profile;

    let bare = Caller::new("v", DOMAIN, RoleType::User);
    let err = profile.get(Some(bare.clone())).await.unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    let mut options = MfaOptions::new();
    options.insert("email".to_string(), "v@example.com".to_string());
    let request = EnableMfaRequest {
        mfa_type: "EMAIL".to_string(),
        options,
    };
    let err = profile.enable_mfa(Some(bare), request.clone()).await.unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");
    assert!(t.user("v").mfa.is_none());
    assert!(t.notifier.sent().is_empty());

    // A read grant does not cover writes
    let reader = Caller::new("v", DOMAIN, RoleType::User)
        .with_permissions([permissions::USER_PROFILE_READ]);
    let err = profile.enable_mfa(Some(reader), request.clone()).await.unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    assert!(profile.enable_mfa(Some(account("v")), request).await.is_success());
}

#[tokio::test]
async fn test_concurrent_creates_for_one_user() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    let requests = vec![
        workspace_binding("u", "role-member", "ws-1"),
        domain_binding("u", "role-admin"),
        workspace_binding("u", "role-owner", "ws-2"),
        domain_binding("u", "role-admin-2"),
        workspace_binding("u", "role-owner", "ws-1"),
    ];
    let results = join_all(
        requests
            .into_iter()
            .map(|request| rb.create(Some(domain_admin()), request)),
    )
    .await;

    assert!(results.iter().all(|r| r.is_success()));
    assert_eq!(t.bindings_of("u").len(), 5);
    assert_eq!(t.user("u").role_type, RoleType::DomainAdmin);
    assert_eq!(t.backend.events().len(), 5);
    assert!(t.platform.locks.is_empty());
}

#[tokio::test]
async fn test_locks_released_after_anonymous_resets() {
    let t = TestPlatform::new();

    for i in 0..200 {
        let err = t
            .platform
            .user_profile
            .reset_password(&format!("nobody-{}", i), DOMAIN)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "USER_NOT_FOUND");
    }

    assert!(t.platform.locks.is_empty());
}

#[tokio::test]
async fn test_failed_commit_leaves_no_partial_writes() {
    let t = TestPlatform::new();
    t.add_user(User::new("u", DOMAIN));
    let rb = &t.platform.role_bindings;

    t.backend.set_fail_commits(true);
    let err = rb
        .create(Some(domain_admin()), domain_binding("u", "role-admin"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "COMMIT_FAILED");
    assert_eq!(t.user("u").role_type, RoleType::User);
    assert!(t.bindings_of("u").is_empty());
    assert!(t.backend.events().is_empty());
    assert!(t.backend.audit_logs().is_empty());

    t.backend.set_fail_commits(false);
    assert!(rb
        .create(Some(domain_admin()), domain_binding("u", "role-admin"))
        .await
        .is_success());
    assert_eq!(t.user("u").role_type, RoleType::DomainAdmin);
}
