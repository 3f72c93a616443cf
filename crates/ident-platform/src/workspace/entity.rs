//! Workspace Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::usecase::HasId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceState {
    Enabled,
    Disabled,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self::Enabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(rename = "_id")]
    pub workspace_id: String,

    pub name: String,

    #[serde(default)]
    pub state: WorkspaceState,

    pub domain_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(
        workspace_id: impl Into<String>,
        name: impl Into<String>,
        domain_id: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            name: name.into(),
            state: WorkspaceState::Enabled,
            domain_id: domain_id.into(),
            created_at: Utc::now(),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.state = WorkspaceState::Disabled;
        self
    }
}

impl HasId for Workspace {
    fn id(&self) -> &str {
        &self.workspace_id
    }

    fn collection_name() -> &'static str {
        "workspaces"
    }
}
