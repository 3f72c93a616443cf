//! Change Role of a Role Binding Use Case

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::events::RoleBindingRoleChanged;
use crate::role::{Role, RoleStore, RoleType};
use crate::role_binding::aggregator::RoleTypeAggregator;
use crate::role_binding::entity::{RoleBinding, WorkspaceScope};
use crate::role_binding::repository::RoleBindingStore;
use crate::shared::UserLocks;
use crate::usecase::{Change, ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::{User, UserStore};

const WORKSPACE_ROLE_TYPES: &[RoleType] = &[RoleType::WorkspaceOwner, RoleType::WorkspaceMember];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleCommand {
    pub role_binding_id: String,
    /// Role the binding is re-pointed to
    pub role_id: String,
    pub domain_id: String,
    pub workspace_scope: WorkspaceScope,
}

pub struct ChangeRoleUseCase<U: UnitOfWork> {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    bindings: Arc<dyn RoleBindingStore>,
    locks: Arc<UserLocks>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> ChangeRoleUseCase<U> {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        bindings: Arc<dyn RoleBindingStore>,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            users,
            roles,
            bindings,
            locks,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: ChangeRoleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RoleBinding> {
        let owner = match find_scoped(
            self.bindings.as_ref(),
            &command.role_binding_id,
            &command.domain_id,
            &command.workspace_scope,
        )
        .await
        {
            Ok(binding) => binding.user_id,
            Err(e) => return UseCaseResult::failure(e),
        };
        let _guard = self.locks.lock(&command.domain_id, &owner).await;

        let (user, binding, previous_role_id) = match self.plan(&command).await {
            Ok(plan) => plan,
            Err(e) => {
                debug!(
                    role_binding_id = %command.role_binding_id,
                    role_id = %command.role_id,
                    code = e.code(),
                    "Role change rejected"
                );
                return UseCaseResult::failure(e);
            }
        };

        let changes = match (Change::upsert(&user), Change::upsert(&binding)) {
            (Ok(user_change), Ok(binding_change)) => vec![user_change, binding_change],
            (Err(e), _) | (_, Err(e)) => return UseCaseResult::failure(e.into()),
        };
        let event = RoleBindingRoleChanged::new(&ctx, &binding, &previous_role_id, user.role_type);

        let result = self
            .unit_of_work
            .commit_changes(changes, event, &command)
            .await
            .map(|_| binding);

        if result.is_success() {
            info!(
                role_binding_id = %command.role_binding_id,
                previous_role_id = %previous_role_id,
                role_id = %command.role_id,
                user_role_type = %user.role_type,
                "Role binding re-pointed"
            );
        }
        result
    }

    /// Re-reads the binding under the user lock.
    async fn plan(
        &self,
        command: &ChangeRoleCommand,
    ) -> Result<(User, RoleBinding, String), UseCaseError> {
        let domain_id = command.domain_id.as_str();
        let mut binding = find_scoped(
            self.bindings.as_ref(),
            &command.role_binding_id,
            domain_id,
            &command.workspace_scope,
        )
        .await?;

        let role = self
            .roles
            .find(&command.role_id, domain_id)
            .await?
            .ok_or_else(|| UseCaseError::role_not_found(&command.role_id, domain_id))?;

        check_compatible(binding.role_type, &role)?;

        if let Some(existing) = self
            .bindings
            .find_duplicate(&binding.user_id, &role.role_id, &binding.workspace_id, domain_id)
            .await?
        {
            if existing.role_binding_id != binding.role_binding_id {
                return Err(UseCaseError::role_binding_already_exists(
                    &binding.user_id,
                    &role.role_id,
                    &binding.workspace_id,
                ));
            }
        }

        let mut user = self
            .users
            .find(&binding.user_id, domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&binding.user_id, domain_id))?;
        user.role_type = RoleTypeAggregator::after_bind(user.role_type, role.role_type);

        let previous_role_id = binding.role_id.clone();
        binding.rebind(&role);

        Ok((user, binding, previous_role_id))
    }
}

/// Binding by id, treated as absent when outside `scope`.
pub(crate) async fn find_scoped(
    bindings: &dyn RoleBindingStore,
    role_binding_id: &str,
    domain_id: &str,
    scope: &WorkspaceScope,
) -> Result<RoleBinding, UseCaseError> {
    bindings
        .find(role_binding_id, domain_id)
        .await?
        .filter(|binding| scope.admits(&binding.workspace_id))
        .ok_or_else(|| UseCaseError::role_binding_not_found(role_binding_id, domain_id))
}

/// Workspace bindings may move between workspace roles; any other binding
/// only to a role of exactly its current type.
pub fn check_compatible(current: RoleType, role: &Role) -> Result<(), UseCaseError> {
    if current.is_workspace_role() {
        if role.role_type.is_workspace_role() {
            return Ok(());
        }
        return Err(UseCaseError::not_allowed_role_type(
            &role.role_id,
            role.role_type,
            WORKSPACE_ROLE_TYPES,
        ));
    }

    if role.role_type == current {
        Ok(())
    } else {
        Err(UseCaseError::not_allowed_role_type(
            &role.role_id,
            role.role_type,
            &[current],
        ))
    }
}
