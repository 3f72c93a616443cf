//! Delete Role Binding Use Case

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::change_role::find_scoped;
use super::events::RoleBindingDeleted;
use crate::role::RoleType;
use crate::role_binding::aggregator::RoleTypeAggregator;
use crate::role_binding::entity::{RoleBinding, WorkspaceScope};
use crate::role_binding::repository::RoleBindingStore;
use crate::shared::UserLocks;
use crate::usecase::{Change, ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::{User, UserStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoleBindingCommand {
    pub role_binding_id: String,
    pub domain_id: String,
    pub workspace_scope: WorkspaceScope,
}

pub struct DeleteRoleBindingUseCase<U: UnitOfWork> {
    users: Arc<dyn UserStore>,
    bindings: Arc<dyn RoleBindingStore>,
    locks: Arc<UserLocks>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> DeleteRoleBindingUseCase<U> {
    pub fn new(
        users: Arc<dyn UserStore>,
        bindings: Arc<dyn RoleBindingStore>,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            users,
            bindings,
            locks,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: DeleteRoleBindingCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<()> {
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

        let (binding, user) = match self.plan(&command).await {
            Ok(plan) => plan,
            Err(e) => {
                debug!(role_binding_id = %command.role_binding_id, code = e.code(), "Role binding delete rejected");
                return UseCaseResult::failure(e);
            }
        };

        let user_change = match Change::upsert(&user) {
            Ok(change) => change,
            Err(e) => return UseCaseResult::failure(e.into()),
        };
        let user_role_type = user.role_type;
        let changes = vec![user_change, Change::delete(&binding)];

        let event = RoleBindingDeleted::new(&ctx, &binding, user_role_type);
        let result = self
            .unit_of_work
            .commit_changes(changes, event, &command)
            .await
            .map(|_| ());

        if result.is_success() {
            info!(
                role_binding_id = %binding.role_binding_id,
                user_id = %binding.user_id,
                user_role_type = %user_role_type,
                "Role binding deleted"
            );
        }
        result
    }

    async fn plan(
        &self,
        command: &DeleteRoleBindingCommand,
    ) -> Result<(RoleBinding, User), UseCaseError> {
        let domain_id = command.domain_id.as_str();
        let binding = find_scoped(
            self.bindings.as_ref(),
            &command.role_binding_id,
            domain_id,
            &command.workspace_scope,
        )
        .await?;

        let remaining: Vec<RoleType> = self
            .bindings
            .find_by_user(&binding.user_id, domain_id)
            .await?
            .into_iter()
            .filter(|other| other.role_binding_id != binding.role_binding_id)
            .map(|other| other.role_type)
            .collect();

        let mut user = self
            .users
            .find(&binding.user_id, domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&binding.user_id, domain_id))?;
        user.role_type = RoleTypeAggregator::recompute(user.role_type, remaining);

        Ok((binding, user))
    }
}
