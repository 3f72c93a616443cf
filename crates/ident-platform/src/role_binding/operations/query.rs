//! Role Binding Read Queries
//!
//! get / list / stat. Results are limited to the caller's domain and
//! workspace scope; nothing else is checked.

use std::sync::Arc;

use super::change_role::find_scoped;
use crate::role_binding::entity::{RoleBinding, WorkspaceScope};
use crate::role_binding::repository::{RoleBindingQuery, RoleBindingStore, StatField};
use crate::shared::pagination::{PageResult, StatResult};
use crate::usecase::{UseCaseError, UseCaseResult};

pub struct RoleBindingQueries {
    bindings: Arc<dyn RoleBindingStore>,
}

impl RoleBindingQueries {
    pub fn new(bindings: Arc<dyn RoleBindingStore>) -> Self {
        Self { bindings }
    }

    pub async fn get(
        &self,
        role_binding_id: &str,
        domain_id: &str,
        scope: &WorkspaceScope,
    ) -> UseCaseResult<RoleBinding> {
        UseCaseResult::from_read(
            find_scoped(self.bindings.as_ref(), role_binding_id, domain_id, scope).await,
        )
    }

    pub async fn list(
        &self,
        query: &RoleBindingQuery,
        domain_id: &str,
        scope: &WorkspaceScope,
    ) -> UseCaseResult<PageResult<RoleBinding>> {
        UseCaseResult::from_read(
            self.bindings
                .list(domain_id, scope, query)
                .await
                .map_err(UseCaseError::from),
        )
    }

    pub async fn stat(
        &self,
        query: &RoleBindingQuery,
        group_by: StatField,
        domain_id: &str,
        scope: &WorkspaceScope,
    ) -> UseCaseResult<StatResult> {
        UseCaseResult::from_read(
            self.bindings
                .stat(domain_id, scope, query, group_by)
                .await
                .map_err(UseCaseError::from),
        )
    }
}
