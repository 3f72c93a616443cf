//! Operation Descriptors
//!
//! Static description of every exposed operation: which permission it needs,
//! which role types may call it and which chain stages it opts out of.

use super::caller::permissions;
use crate::role::RoleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authentication,
    Authorization,
    Mutation,
    Event,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::Mutation => "mutation",
            Self::Event => "event",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OperationDescriptor {
    pub resource: &'static str,
    pub verb: &'static str,
    pub permission: Option<&'static str>,
    /// Role types admitted by authorization. `USER` admits every account.
    pub role_types: &'static [RoleType],
    pub mutating: bool,
    pub skip: &'static [Stage],
}

impl OperationDescriptor {
    pub fn runs(&self, stage: Stage) -> bool {
        !self.skip.contains(&stage)
    }

    /// True when any authenticated account may call the operation.
    pub fn is_self_service(&self) -> bool {
        self.role_types.contains(&RoleType::User)
    }

    pub fn name(&self) -> String {
        format!("{}.{}", self.resource, self.verb)
    }
}

const BINDING_WRITERS: &[RoleType] = &[RoleType::DomainAdmin, RoleType::WorkspaceOwner];
const BINDING_READERS: &[RoleType] = &[
    RoleType::DomainAdmin,
    RoleType::WorkspaceOwner,
    RoleType::WorkspaceMember,
];
const ANY_ACCOUNT: &[RoleType] = &[RoleType::User];

const fn role_binding(
    verb: &'static str,
    permission: &'static str,
    role_types: &'static [RoleType],
    mutating: bool,
) -> OperationDescriptor {
    OperationDescriptor {
        resource: "RoleBinding",
        verb,
        permission: Some(permission),
        role_types,
        mutating,
        skip: &[],
    }
}

const fn user_profile(verb: &'static str, permission: &'static str, mutating: bool) -> OperationDescriptor {
    OperationDescriptor {
        resource: "UserProfile",
        verb,
        permission: Some(permission),
        role_types: ANY_ACCOUNT,
        mutating,
        skip: &[],
    }
}

pub const ROLE_BINDING_CREATE: OperationDescriptor =
    role_binding("create", permissions::ROLE_BINDING_WRITE, BINDING_WRITERS, true);
pub const ROLE_BINDING_UPDATE_ROLE: OperationDescriptor =
    role_binding("update_role", permissions::ROLE_BINDING_WRITE, BINDING_WRITERS, true);
pub const ROLE_BINDING_DELETE: OperationDescriptor =
    role_binding("delete", permissions::ROLE_BINDING_WRITE, BINDING_WRITERS, true);
pub const ROLE_BINDING_GET: OperationDescriptor =
    role_binding("get", permissions::ROLE_BINDING_READ, BINDING_READERS, false);
pub const ROLE_BINDING_LIST: OperationDescriptor =
    role_binding("list", permissions::ROLE_BINDING_READ, BINDING_READERS, false);
pub const ROLE_BINDING_STAT: OperationDescriptor =
    role_binding("stat", permissions::ROLE_BINDING_READ, BINDING_READERS, false);

pub const USER_PROFILE_UPDATE: OperationDescriptor =
    user_profile("update", permissions::USER_PROFILE_WRITE, true);
pub const USER_PROFILE_VERIFY_EMAIL: OperationDescriptor =
    user_profile("verify_email", permissions::USER_PROFILE_WRITE, true);
pub const USER_PROFILE_CONFIRM_EMAIL: OperationDescriptor =
    user_profile("confirm_email", permissions::USER_PROFILE_WRITE, true);
pub const USER_PROFILE_ENABLE_MFA: OperationDescriptor =
    user_profile("enable_mfa", permissions::USER_PROFILE_WRITE, true);
pub const USER_PROFILE_DISABLE_MFA: OperationDescriptor =
    user_profile("disable_mfa", permissions::USER_PROFILE_WRITE, true);
pub const USER_PROFILE_CONFIRM_MFA: OperationDescriptor =
    user_profile("confirm_mfa", permissions::USER_PROFILE_WRITE, true);
pub const USER_PROFILE_GET: OperationDescriptor =
    user_profile("get", permissions::USER_PROFILE_READ, false);
pub const USER_PROFILE_GET_WORKSPACES: OperationDescriptor =
    user_profile("get_workspaces", permissions::USER_PROFILE_READ, false);

/// Public: the caller has lost access to their account.
pub const USER_PROFILE_RESET_PASSWORD: OperationDescriptor = OperationDescriptor {
    resource: "UserProfile",
    verb: "reset_password",
    permission: None,
    role_types: &[],
    mutating: true,
    skip: &[Stage::Authentication, Stage::Authorization, Stage::Mutation],
};
