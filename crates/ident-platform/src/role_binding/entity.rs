//! Role Binding Entity
//!
//! Assignment of a role to a user, either domain-wide or in one workspace.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::{Role, RoleType};
use crate::shared::tsid::TsidGenerator;
use crate::usecase::HasId;

/// `workspace_id` of every `DOMAIN` binding.
pub const ALL_WORKSPACES: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceGroup {
    Domain,
    Workspace,
}

impl ResourceGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "DOMAIN",
            Self::Workspace => "WORKSPACE",
        }
    }
}

/// Workspaces an operation may see or touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "workspaceIds", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceScope {
    /// Domain-wide, including `*` bindings
    All,
    Only(Vec<String>),
}

impl WorkspaceScope {
    pub fn admits(&self, workspace_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.iter().any(|id| id == workspace_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    #[serde(rename = "_id")]
    pub role_binding_id: String,

    pub user_id: String,

    pub role_id: String,

    /// Copied from the role when bound
    pub role_type: RoleType,

    pub resource_group: ResourceGroup,

    /// Concrete workspace, or `*` for `DOMAIN` bindings
    pub workspace_id: String,

    pub domain_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl RoleBinding {
    pub fn new(
        user_id: impl Into<String>,
        role: &Role,
        resource_group: ResourceGroup,
        workspace_id: impl Into<String>,
    ) -> Self {
        Self {
            role_binding_id: TsidGenerator::prefixed("rb"),
            user_id: user_id.into(),
            role_id: role.role_id.clone(),
            role_type: role.role_type,
            resource_group,
            workspace_id: workspace_id.into(),
            domain_id: role.domain_id.clone(),
            created_at: Utc::now(),
        }
    }

    /// Re-point to another role, snapshotting its type.
    pub fn rebind(&mut self, role: &Role) {
        self.role_id = role.role_id.clone();
        self.role_type = role.role_type;
    }
}

impl HasId for RoleBinding {
    fn id(&self) -> &str {
        &self.role_binding_id
    }

    fn collection_name() -> &'static str {
        "role_bindings"
    }
}
