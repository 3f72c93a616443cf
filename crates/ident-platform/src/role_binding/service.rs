//! Role Binding Service
//!
//! Pairs each role binding operation with its descriptor and runs it through
//! the handler chain. Domain and workspace scope come from the caller, never
//! from the request.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::entity::{ResourceGroup, RoleBinding, WorkspaceScope};
use super::operations::{
    ChangeRoleCommand, ChangeRoleUseCase, CreateRoleBindingCommand, CreateRoleBindingUseCase,
    DeleteRoleBindingCommand, DeleteRoleBindingUseCase, RoleBindingQueries,
};
use super::repository::{RoleBindingQuery, StatField};
use crate::bootstrap::Stores;
use crate::details;
use crate::handler::descriptor::{
    ROLE_BINDING_CREATE, ROLE_BINDING_DELETE, ROLE_BINDING_GET, ROLE_BINDING_LIST,
    ROLE_BINDING_STAT, ROLE_BINDING_UPDATE_ROLE,
};
use crate::handler::{Caller, HandlerChain, RequestScope};
use crate::shared::pagination::{PageResult, StatResult};
use crate::shared::UserLocks;
use crate::usecase::{UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleBindingRequest {
    pub user_id: String,
    pub role_id: String,
    pub resource_group: ResourceGroup,
    #[serde(default)]
    pub workspace_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role_binding_id: String,
    pub role_id: String,
}

pub struct RoleBindingService<U: UnitOfWork> {
    chain: Arc<HandlerChain>,
    create: CreateRoleBindingUseCase<U>,
    change_role: ChangeRoleUseCase<U>,
    delete: DeleteRoleBindingUseCase<U>,
    queries: RoleBindingQueries,
}

impl<U: UnitOfWork> RoleBindingService<U> {
    pub fn new(
        stores: &Stores,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
        chain: Arc<HandlerChain>,
    ) -> Self {
        Self {
            chain,
            create: CreateRoleBindingUseCase::new(
                stores.users.clone(),
                stores.roles.clone(),
                stores.workspaces.clone(),
                stores.role_bindings.clone(),
                locks.clone(),
                unit_of_work.clone(),
            ),
            change_role: ChangeRoleUseCase::new(
                stores.users.clone(),
                stores.roles.clone(),
                stores.role_bindings.clone(),
                locks.clone(),
                unit_of_work.clone(),
            ),
            delete: DeleteRoleBindingUseCase::new(
                stores.users.clone(),
                stores.role_bindings.clone(),
                locks,
                unit_of_work,
            ),
            queries: RoleBindingQueries::new(stores.role_bindings.clone()),
        }
    }

    pub async fn create(
        &self,
        caller: Option<Caller>,
        request: CreateRoleBindingRequest,
    ) -> UseCaseResult<RoleBinding> {
        self.chain
            .run(&ROLE_BINDING_CREATE, caller, |inv| async move {
                let scope = match inv.scope().and_then(|s| admit_new_binding(s, &request)) {
                    Ok(scope) => scope,
                    Err(e) => return UseCaseResult::failure(e),
                };
                let command = CreateRoleBindingCommand {
                    user_id: request.user_id,
                    role_id: request.role_id,
                    resource_group: request.resource_group,
                    workspace_id: request.workspace_id,
                    domain_id: scope.domain_id,
                };
                self.create.execute(command, inv.context).await
            })
            .await
    }

    pub async fn update_role(
        &self,
        caller: Option<Caller>,
        request: UpdateRoleRequest,
    ) -> UseCaseResult<RoleBinding> {
        self.chain
            .run(&ROLE_BINDING_UPDATE_ROLE, caller, |inv| async move {
                let scope = match inv.scope() {
                    Ok(scope) => scope.clone(),
                    Err(e) => return UseCaseResult::failure(e),
                };
                let command = ChangeRoleCommand {
                    role_binding_id: request.role_binding_id,
                    role_id: request.role_id,
                    domain_id: scope.domain_id,
                    workspace_scope: scope.workspace_scope,
                };
                self.change_role.execute(command, inv.context).await
            })
            .await
    }

    pub async fn delete(&self, caller: Option<Caller>, role_binding_id: &str) -> UseCaseResult<()> {
        self.chain
            .run(&ROLE_BINDING_DELETE, caller, |inv| async move {
                let scope = match inv.scope() {
                    Ok(scope) => scope.clone(),
                    Err(e) => return UseCaseResult::failure(e),
                };
                let command = DeleteRoleBindingCommand {
                    role_binding_id: role_binding_id.to_string(),
                    domain_id: scope.domain_id,
                    workspace_scope: scope.workspace_scope,
                };
                self.delete.execute(command, inv.context).await
            })
            .await
    }

    pub async fn get(&self, caller: Option<Caller>, role_binding_id: &str) -> UseCaseResult<RoleBinding> {
        self.chain
            .run(&ROLE_BINDING_GET, caller, |inv| async move {
                match inv.scope() {
                    Ok(scope) => {
                        self.queries
                            .get(role_binding_id, &scope.domain_id, &scope.workspace_scope)
                            .await
                    }
                    Err(e) => UseCaseResult::failure(e),
                }
            })
            .await
    }

    pub async fn list(
        &self,
        caller: Option<Caller>,
        query: RoleBindingQuery,
    ) -> UseCaseResult<PageResult<RoleBinding>> {
        self.chain
            .run(&ROLE_BINDING_LIST, caller, |inv| async move {
                match inv.scope() {
                    Ok(scope) => {
                        self.queries
                            .list(&query, &scope.domain_id, &scope.workspace_scope)
                            .await
                    }
                    Err(e) => UseCaseResult::failure(e),
                }
            })
            .await
    }

    pub async fn stat(
        &self,
        caller: Option<Caller>,
        query: RoleBindingQuery,
        group_by: StatField,
    ) -> UseCaseResult<StatResult> {
        self.chain
            .run(&ROLE_BINDING_STAT, caller, |inv| async move {
                match inv.scope() {
                    Ok(scope) => {
                        self.queries
                            .stat(&query, group_by, &scope.domain_id, &scope.workspace_scope)
                            .await
                    }
                    Err(e) => UseCaseResult::failure(e),
                }
            })
            .await
    }
}

/// Workspace-scoped callers may only bind inside their own workspaces.
fn admit_new_binding(
    scope: &RequestScope,
    request: &CreateRoleBindingRequest,
) -> Result<RequestScope, UseCaseError> {
    if let WorkspaceScope::Only(_) = &scope.workspace_scope {
        let target = match request.resource_group {
            ResourceGroup::Domain => None,
            ResourceGroup::Workspace => request.workspace_id.as_deref(),
        };
        let admitted = target.map_or(false, |id| scope.workspace_scope.admits(id));
        if !admitted {
            return Err(UseCaseError::authorization_with_details(
                "PERMISSION_DENIED",
                format!(
                    "User '{}' may not bind roles outside their workspaces",
                    scope.user_id
                ),
                details! {
                    "resource_group" => request.resource_group.as_str(),
                    "workspace_id" => target.unwrap_or_default(),
                },
            ));
        }
    }
    Ok(scope.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(group: ResourceGroup, workspace_id: Option<&str>) -> CreateRoleBindingRequest {
        CreateRoleBindingRequest {
            user_id: "bob".to_string(),
            role_id: "r-1".to_string(),
            resource_group: group,
            workspace_id: workspace_id.map(str::to_string),
        }
    }

    fn scope(workspace_scope: WorkspaceScope) -> RequestScope {
        RequestScope {
            domain_id: "d-1".to_string(),
            user_id: "owner".to_string(),
            workspace_scope,
        }
    }

    #[test]
    fn test_workspace_owner_binds_only_in_own_workspaces() {
        let owner = scope(WorkspaceScope::Only(vec!["ws-1".to_string()]));

        assert!(admit_new_binding(&owner, &request(ResourceGroup::Workspace, Some("ws-1"))).is_ok());

        let err = admit_new_binding(&owner, &request(ResourceGroup::Workspace, Some("ws-2")))
            .unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");

        let err = admit_new_binding(&owner, &request(ResourceGroup::Domain, None)).unwrap_err();
        assert_eq!(err.details().get("resource_group"), Some(&serde_json::json!("DOMAIN")));
    }

    #[test]
    fn test_domain_scope_admits_everything() {
        let admin = scope(WorkspaceScope::All);
        assert!(admit_new_binding(&admin, &request(ResourceGroup::Domain, None)).is_ok());
        assert!(admit_new_binding(&admin, &request(ResourceGroup::Workspace, Some("ws-9"))).is_ok());
    }
}
