//! Enable MFA Use Case

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::events::MfaEnrolled;
use crate::mfa::strategy::MfaStrategyRegistry;
use crate::shared::UserLocks;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::{MfaOptions, MfaSettings, MfaState, MfaType, User, UserStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableMfaCommand {
    pub user_id: String,
    pub domain_id: String,
    pub mfa_type: String,
    #[serde(default)]
    pub options: MfaOptions,
}

pub struct EnableMfaUseCase<U: UnitOfWork> {
    users: Arc<dyn UserStore>,
    strategies: Arc<MfaStrategyRegistry>,
    locks: Arc<UserLocks>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> EnableMfaUseCase<U> {
    pub fn new(
        users: Arc<dyn UserStore>,
        strategies: Arc<MfaStrategyRegistry>,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            users,
            strategies,
            locks,
            unit_of_work,
        }
    }

    pub async fn execute(&self, command: EnableMfaCommand, ctx: ExecutionContext) -> UseCaseResult<User> {
        let _guard = self.locks.lock(&command.domain_id, &command.user_id).await;

        let (user, mfa_type) = match self.enroll(&command).await {
            Ok(enrolled) => enrolled,
            Err(e) => {
                debug!(user_id = %command.user_id, code = e.code(), "MFA enable rejected");
                return UseCaseResult::failure(e);
            }
        };

        let event = MfaEnrolled::new(&ctx, &user, mfa_type, &command.options);
        let committed = self.unit_of_work.commit(&user, event, &command).await;
        let result = committed.map(|_| user);

        if result.is_success() {
            info!(user_id = %command.user_id, mfa_type = mfa_type.as_str(), "MFA enrolled, awaiting confirmation");
        }
        result
    }

    /// Validate, run the strategy's enroll step and return the updated user.
    async fn enroll(&self, command: &EnableMfaCommand) -> Result<(User, MfaType), UseCaseError> {
        let mut user = self
            .users
            .find(&command.user_id, &command.domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&command.user_id, &command.domain_id))?;

        if command.options.is_empty() {
            return Err(UseCaseError::required_parameter("options"));
        }
        if user.mfa_state() == MfaState::Enabled {
            return Err(UseCaseError::mfa_already_enabled(&user.user_id));
        }

        let (mfa_type, strategy) = self.strategies.resolve_str(&command.mfa_type)?;
        strategy.enroll(&user, &command.options).await?;

        user.mfa = Some(MfaSettings {
            state: MfaState::Disabled,
            mfa_type: Some(mfa_type),
            options: command.options.clone(),
        });
        Ok((user, mfa_type))
    }
}
