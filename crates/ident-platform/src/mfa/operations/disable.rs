//! Disable MFA Use Case
//!
//! Only sends the confirmation code. The state flips when the user confirms.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::mfa::strategy::MfaStrategyRegistry;
use crate::shared::UserLocks;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};
use crate::user::{MfaState, User, UserStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableMfaCommand {
    pub user_id: String,
    pub domain_id: String,
}

pub struct DisableMfaUseCase {
    users: Arc<dyn UserStore>,
    strategies: Arc<MfaStrategyRegistry>,
    locks: Arc<UserLocks>,
}

impl DisableMfaUseCase {
    pub fn new(
        users: Arc<dyn UserStore>,
        strategies: Arc<MfaStrategyRegistry>,
        locks: Arc<UserLocks>,
    ) -> Self {
        Self {
            users,
            strategies,
            locks,
        }
    }

    pub async fn execute(&self, command: DisableMfaCommand, ctx: ExecutionContext) -> UseCaseResult<User> {
        let _guard = self.locks.lock(&command.domain_id, &command.user_id).await;

        let result = self.request(&command).await;
        match &result {
            Ok(_) => info!(
                user_id = %command.user_id,
                execution_id = %ctx.execution_id,
                "MFA disable requested"
            ),
            Err(e) => debug!(user_id = %command.user_id, code = e.code(), "MFA disable rejected"),
        }
        UseCaseResult::from_read(result)
    }

    async fn request(&self, command: &DisableMfaCommand) -> Result<User, UseCaseError> {
        let user = self
            .users
            .find(&command.user_id, &command.domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&command.user_id, &command.domain_id))?;

        let mfa_type = match user.mfa_type() {
            Some(mfa_type) if user.mfa_state() == MfaState::Enabled => mfa_type,
            _ => return Err(UseCaseError::mfa_already_disabled(&user.user_id)),
        };

        self.strategies
            .resolve(mfa_type)?
            .send_disable_notice(&user)
            .await?;
        Ok(user)
    }
}
