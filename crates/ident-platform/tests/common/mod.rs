//! Shared fixtures: an in-memory platform seeded with one domain, recording
//! fakes for outbound email and temporary tokens.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ident_config::AppConfig;
use ident_platform::bootstrap::{email_strategies, Platform};
use ident_platform::domain::Domain;
use ident_platform::handler::{permissions, Caller};
use ident_platform::memory::MemoryBackend;
use ident_platform::mfa::{CodePurpose, MemoryVerifyCodeStore};
use ident_platform::notify::{EmailMessage, Notifier, NotifyError};
use ident_platform::password::{Argon2Config, PasswordPolicy, PasswordService, RandomPasswordGenerator};
use ident_platform::role::{Role, RoleType};
use ident_platform::role_binding::{CreateRoleBindingRequest, ResourceGroup, RoleBinding};
use ident_platform::token::{TokenError, TokenIssuer};
use ident_platform::user::User;
use ident_platform::user_profile::ProfileCollaborators;
use ident_platform::workspace::Workspace;

pub const DOMAIN: &str = "d-1";
pub const DOMAIN_NAME: &str = "acme";

/// Captures every message instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: parking_lot::Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    pub fn last(&self) -> Option<EmailMessage> {
        self.sent.lock().last().cloned()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("relay unavailable".to_string()));
        }
        self.sent.lock().push(message);
        Ok(())
    }
}

/// Issues `tmp-<user_id>` and remembers the requested timeouts.
#[derive(Default)]
pub struct FixedTokenIssuer {
    timeouts: parking_lot::Mutex<Vec<u64>>,
}

impl FixedTokenIssuer {
    pub fn timeouts(&self) -> Vec<u64> {
        self.timeouts.lock().clone()
    }
}

#[async_trait]
impl TokenIssuer for FixedTokenIssuer {
    async fn issue_temporary_token(&self, user: &User, timeout_secs: u64) -> Result<String, TokenError> {
        self.timeouts.lock().push(timeout_secs);
        Ok(format!("tmp-{}", user.user_id))
    }
}

pub struct TestPlatform {
    pub backend: Arc<MemoryBackend>,
    pub codes: Arc<MemoryVerifyCodeStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub tokens: Arc<FixedTokenIssuer>,
    pub passwords: Arc<PasswordService>,
    pub config: AppConfig,
    pub platform: Platform<MemoryBackend>,
}

impl TestPlatform {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let backend = MemoryBackend::new();
        let codes = Arc::new(MemoryVerifyCodeStore::new());
        let stores = backend.stores(codes.clone());
        let notifier = Arc::new(RecordingNotifier::default());
        let tokens = Arc::new(FixedTokenIssuer::default());
        let passwords = Arc::new(
            PasswordService::new(Argon2Config::testing(), PasswordPolicy::default()).unwrap(),
        );

        let collaborators = ProfileCollaborators {
            notifier: notifier.clone(),
            tokens: tokens.clone(),
            generator: Arc::new(RandomPasswordGenerator),
            passwords: passwords.clone(),
            strategies: Arc::new(email_strategies(codes.clone(), notifier.clone(), &config.mfa)),
        };
        let platform = Platform::assemble(&stores, collaborators, &config, backend.clone());

        seed(&backend);

        Self {
            backend,
            codes,
            notifier,
            tokens,
            passwords,
            config,
            platform,
        }
    }

    pub fn add_user(&self, user: User) -> User {
        self.backend.insert(&user).unwrap();
        user
    }

    pub fn user(&self, user_id: &str) -> User {
        self.backend
            .all::<User>()
            .unwrap()
            .into_iter()
            .find(|u| u.user_id == user_id && u.domain_id == DOMAIN)
            .unwrap_or_else(|| panic!("user {} not seeded", user_id))
    }

    pub fn bindings_of(&self, user_id: &str) -> Vec<RoleBinding> {
        self.backend
            .all::<RoleBinding>()
            .unwrap()
            .into_iter()
            .filter(|b| b.user_id == user_id)
            .collect()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.backend.events().into_iter().map(|e| e.event_type).collect()
    }

    pub fn mfa_code(&self, user_id: &str) -> String {
        self.codes
            .peek(&CodePurpose::Mfa.key(DOMAIN, user_id))
            .expect("no MFA code issued")
    }

    pub fn email_code(&self, user_id: &str) -> String {
        self.codes
            .peek(&CodePurpose::Email.key(DOMAIN, user_id))
            .expect("no email code issued")
    }
}

/// Domain `acme` with two domain-admin roles, two workspace roles, a plain
/// user role, two enabled workspaces and one disabled one.
fn seed(backend: &MemoryBackend) {
    backend.insert(&Domain::new(DOMAIN, DOMAIN_NAME)).unwrap();

    for role in [
        Role::new("role-admin", "Administrator", RoleType::DomainAdmin, DOMAIN),
        Role::new("role-admin-2", "Auditor", RoleType::DomainAdmin, DOMAIN),
        Role::new("role-owner", "Owner", RoleType::WorkspaceOwner, DOMAIN),
        Role::new("role-member", "Member", RoleType::WorkspaceMember, DOMAIN),
        Role::new("role-user", "User", RoleType::User, DOMAIN),
        Role::new("role-foreign", "Foreign admin", RoleType::DomainAdmin, "d-2"),
    ] {
        backend.insert(&role).unwrap();
    }

    for workspace in [
        Workspace::new("ws-1", "Sales", DOMAIN),
        Workspace::new("ws-2", "Support", DOMAIN),
        Workspace::new("ws-3", "Archive", DOMAIN).disabled(),
    ] {
        backend.insert(&workspace).unwrap();
    }
}

pub fn domain_admin() -> Caller {
    Caller::new("admin", DOMAIN, RoleType::DomainAdmin)
        .with_permissions([permissions::ROLE_BINDING_READ, permissions::ROLE_BINDING_WRITE])
}

pub fn workspace_owner(workspaces: &[&str]) -> Caller {
    Caller::new("owner", DOMAIN, RoleType::WorkspaceOwner)
        .with_workspaces(workspaces.iter().copied())
        .with_permissions([permissions::ROLE_BINDING_READ, permissions::ROLE_BINDING_WRITE])
}

pub fn account(user_id: &str) -> Caller {
    Caller::new(user_id, DOMAIN, RoleType::User)
        .with_permissions([permissions::USER_PROFILE_READ, permissions::USER_PROFILE_WRITE])
}

pub fn domain_binding(user_id: &str, role_id: &str) -> CreateRoleBindingRequest {
    CreateRoleBindingRequest {
        user_id: user_id.to_string(),
        role_id: role_id.to_string(),
        resource_group: ResourceGroup::Domain,
        workspace_id: None,
    }
}

pub fn workspace_binding(user_id: &str, role_id: &str, workspace_id: &str) -> CreateRoleBindingRequest {
    CreateRoleBindingRequest {
        user_id: user_id.to_string(),
        role_id: role_id.to_string(),
        resource_group: ResourceGroup::Workspace,
        workspace_id: Some(workspace_id.to_string()),
    }
}
