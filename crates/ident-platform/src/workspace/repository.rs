//! Workspace Repository

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use crate::shared::error::Result;
use crate::usecase::HasId;
use crate::workspace::entity::{Workspace, WorkspaceState};

/// Criteria for `WorkspaceStore::filter`. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceFilter {
    pub state: Option<WorkspaceState>,
    pub workspace_ids: Option<Vec<String>>,
}

impl WorkspaceFilter {
    pub fn enabled() -> Self {
        Self {
            state: Some(WorkspaceState::Enabled),
            workspace_ids: None,
        }
    }

    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.workspace_ids = Some(ids);
        self
    }

    pub fn matches(&self, workspace: &Workspace) -> bool {
        self.state.map_or(true, |s| workspace.state == s)
            && self
                .workspace_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&workspace.workspace_id))
    }
}

#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn find(&self, workspace_id: &str, domain_id: &str) -> Result<Option<Workspace>>;

    /// Workspaces of a domain ordered by id.
    async fn filter(&self, domain_id: &str, filter: &WorkspaceFilter) -> Result<Vec<Workspace>>;
}

pub struct WorkspaceRepository {
    collection: Collection<Workspace>,
}

impl WorkspaceRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(Workspace::collection_name()),
        }
    }
}

#[async_trait]
impl WorkspaceStore for WorkspaceRepository {
    async fn find(&self, workspace_id: &str, domain_id: &str) -> Result<Option<Workspace>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": workspace_id, "domainId": domain_id })
            .await?)
    }

    async fn filter(&self, domain_id: &str, filter: &WorkspaceFilter) -> Result<Vec<Workspace>> {
        let mut query = doc! { "domainId": domain_id };
        if let Some(state) = filter.state {
            query.insert("state", bson::to_bson(&state)?);
        }
        if let Some(ids) = &filter.workspace_ids {
            query.insert("_id", doc! { "$in": ids.as_slice() });
        }
        let cursor = self.collection.find(query).sort(doc! { "_id": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }
}
