//! User Profile Read Queries

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::role::RoleType;
use crate::role_binding::{RoleBindingStore, ALL_WORKSPACES};
use crate::shared::pagination::PageResult;
use crate::usecase::{UseCaseError, UseCaseResult};
use crate::user::{User, UserStore};
use crate::workspace::{Workspace, WorkspaceFilter, WorkspaceStore};

pub struct UserProfileQueries {
    users: Arc<dyn UserStore>,
    workspaces: Arc<dyn WorkspaceStore>,
    bindings: Arc<dyn RoleBindingStore>,
}

impl UserProfileQueries {
    pub fn new(
        users: Arc<dyn UserStore>,
        workspaces: Arc<dyn WorkspaceStore>,
        bindings: Arc<dyn RoleBindingStore>,
    ) -> Self {
        Self {
            users,
            workspaces,
            bindings,
        }
    }

    pub async fn get(&self, user_id: &str, domain_id: &str) -> UseCaseResult<User> {
        UseCaseResult::from_read(self.find_user(user_id, domain_id).await)
    }

    /// Enabled workspaces the user can enter.
    pub async fn get_workspaces(&self, user_id: &str, domain_id: &str) -> UseCaseResult<PageResult<Workspace>> {
        UseCaseResult::from_read(self.workspaces_of(user_id, domain_id).await)
    }

    async fn find_user(&self, user_id: &str, domain_id: &str) -> Result<User, UseCaseError> {
        self.users
            .find(user_id, domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(user_id, domain_id))
    }

    async fn workspaces_of(&self, user_id: &str, domain_id: &str) -> Result<PageResult<Workspace>, UseCaseError> {
        let user = self.find_user(user_id, domain_id).await?;

        let filter = if user.role_type == RoleType::DomainAdmin {
            WorkspaceFilter::enabled()
        } else {
            let bindings = self.bindings.find_by_user(&user.user_id, domain_id).await?;
            let workspace_ids: BTreeSet<String> = bindings
                .into_iter()
                .filter(|b| b.role_type.is_workspace_role())
                .map(|b| b.workspace_id)
                .collect();

            if workspace_ids.contains(ALL_WORKSPACES) {
                WorkspaceFilter::enabled()
            } else {
                WorkspaceFilter::enabled().with_ids(workspace_ids.into_iter().collect())
            }
        };

        let results = self.workspaces.filter(domain_id, &filter).await?;
        let total_count = results.len() as u64;
        Ok(PageResult { results, total_count })
    }
}
