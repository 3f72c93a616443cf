//! Create Role Binding Use Case

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::events::RoleBindingCreated;
use crate::role::{Role, RoleStore, RoleType};
use crate::role_binding::aggregator::RoleTypeAggregator;
use crate::role_binding::entity::{ResourceGroup, RoleBinding, ALL_WORKSPACES};
use crate::role_binding::repository::RoleBindingStore;
use crate::shared::UserLocks;
use crate::usecase::{Change, ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::{User, UserStore};
use crate::workspace::WorkspaceStore;

const DOMAIN_ROLE_TYPES: &[RoleType] = &[RoleType::DomainAdmin];
const WORKSPACE_ROLE_TYPES: &[RoleType] = &[RoleType::WorkspaceOwner, RoleType::WorkspaceMember];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleBindingCommand {
    pub user_id: String,
    pub role_id: String,
    pub resource_group: ResourceGroup,
    /// Required for `WORKSPACE`; ignored and forced to `*` for `DOMAIN`
    #[serde(default)]
    pub workspace_id: Option<String>,
    pub domain_id: String,
}

pub struct CreateRoleBindingUseCase<U: UnitOfWork> {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    workspaces: Arc<dyn WorkspaceStore>,
    bindings: Arc<dyn RoleBindingStore>,
    locks: Arc<UserLocks>,
    unit_of_work: Arc<U>,
}

/// Validated outcome, ready to commit.
struct Plan {
    user: User,
    binding: RoleBinding,
    role_type_before: RoleType,
}

impl<U: UnitOfWork> CreateRoleBindingUseCase<U> {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        workspaces: Arc<dyn WorkspaceStore>,
        bindings: Arc<dyn RoleBindingStore>,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            users,
            roles,
            workspaces,
            bindings,
            locks,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: CreateRoleBindingCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RoleBinding> {
        let _guard = self.locks.lock(&command.domain_id, &command.user_id).await;

        let Plan {
            user,
            binding,
            role_type_before,
        } = match self.plan(&command).await {
            Ok(plan) => plan,
            Err(e) => {
                debug!(
                    user_id = %command.user_id,
                    role_id = %command.role_id,
                    code = e.code(),
                    "Role binding rejected"
                );
                return UseCaseResult::failure(e);
            }
        };

        let changes = match (Change::upsert(&user), Change::upsert(&binding)) {
            (Ok(user_change), Ok(binding_change)) => vec![user_change, binding_change],
            (Err(e), _) | (_, Err(e)) => return UseCaseResult::failure(e.into()),
        };
        let event = RoleBindingCreated::new(&ctx, &binding, role_type_before, user.role_type);

        let result = self
            .unit_of_work
            .commit_changes(changes, event, &command)
            .await
            .map(|_| binding);

        if let UseCaseResult::Success(binding) = &result {
            info!(
                role_binding_id = %binding.role_binding_id,
                user_id = %binding.user_id,
                role_type = %binding.role_type,
                user_role_type = %user.role_type,
                "Role binding created"
            );
        }
        result
    }

    async fn plan(&self, command: &CreateRoleBindingCommand) -> Result<Plan, UseCaseError> {
        let domain_id = command.domain_id.as_str();

        let mut user = self
            .users
            .find(&command.user_id, domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&command.user_id, domain_id))?;

        let workspace_id = match command.resource_group {
            ResourceGroup::Domain => ALL_WORKSPACES.to_string(),
            ResourceGroup::Workspace => {
                let workspace_id = command
                    .workspace_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| UseCaseError::required_parameter("workspace_id"))?;
                self.workspaces
                    .find(workspace_id, domain_id)
                    .await?
                    .ok_or_else(|| UseCaseError::workspace_not_found(workspace_id, domain_id))?;
                workspace_id.to_string()
            }
        };

        let role = self
            .roles
            .find(&command.role_id, domain_id)
            .await?
            .ok_or_else(|| UseCaseError::role_not_found(&command.role_id, domain_id))?;

        check_role_scope(&role, command.resource_group)?;

        if self
            .bindings
            .find_duplicate(&user.user_id, &role.role_id, &workspace_id, domain_id)
            .await?
            .is_some()
        {
            return Err(UseCaseError::role_binding_already_exists(
                &user.user_id,
                &role.role_id,
                &workspace_id,
            ));
        }

        let role_type_before = user.role_type;
        user.role_type = RoleTypeAggregator::after_bind(user.role_type, role.role_type);

        let binding = RoleBinding::new(&user.user_id, &role, command.resource_group, workspace_id);

        Ok(Plan {
            user,
            binding,
            role_type_before,
        })
    }
}

/// `DOMAIN` bindings take `DOMAIN_ADMIN` roles, `WORKSPACE` bindings take workspace roles.
pub fn check_role_scope(role: &Role, resource_group: ResourceGroup) -> Result<(), UseCaseError> {
    let allowed = match resource_group {
        ResourceGroup::Domain => DOMAIN_ROLE_TYPES,
        ResourceGroup::Workspace => WORKSPACE_ROLE_TYPES,
    };

    if allowed.contains(&role.role_type) {
        Ok(())
    } else {
        Err(UseCaseError::not_allowed_role_type(
            &role.role_id,
            role.role_type,
            allowed,
        ))
    }
}
