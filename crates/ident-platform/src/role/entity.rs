//! Role Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::usecase::HasId;

/// Privilege level of a role, and the aggregate level stored on a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleType {
    System,
    SystemAdmin,
    DomainAdmin,
    WorkspaceOwner,
    WorkspaceMember,
    User,
}

impl Default for RoleType {
    fn default() -> Self {
        Self::User
    }
}

impl RoleType {
    pub const ALL: [RoleType; 6] = [
        RoleType::System,
        RoleType::SystemAdmin,
        RoleType::DomainAdmin,
        RoleType::WorkspaceOwner,
        RoleType::WorkspaceMember,
        RoleType::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::SystemAdmin => "SYSTEM_ADMIN",
            Self::DomainAdmin => "DOMAIN_ADMIN",
            Self::WorkspaceOwner => "WORKSPACE_OWNER",
            Self::WorkspaceMember => "WORKSPACE_MEMBER",
            Self::User => "USER",
        }
    }

    /// Workspace-scoped role types.
    pub fn is_workspace_role(&self) -> bool {
        matches!(self, Self::WorkspaceOwner | Self::WorkspaceMember)
    }

    /// Platform-level types that role bindings never assign or remove.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System | Self::SystemAdmin)
    }
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown role type '{}'", s))
    }
}

/// Assignable role within a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "_id")]
    pub role_id: String,

    pub name: String,

    pub role_type: RoleType,

    pub domain_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn new(
        role_id: impl Into<String>,
        name: impl Into<String>,
        role_type: RoleType,
        domain_id: impl Into<String>,
    ) -> Self {
        Self {
            role_id: role_id.into(),
            name: name.into(),
            role_type,
            domain_id: domain_id.into(),
            created_at: Utc::now(),
        }
    }
}

impl HasId for Role {
    fn id(&self) -> &str {
        &self.role_id
    }

    fn collection_name() -> &'static str {
        "roles"
    }
}
