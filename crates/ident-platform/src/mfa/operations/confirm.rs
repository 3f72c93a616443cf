//! Confirm MFA Use Case
//!
//! A valid code toggles the MFA state in either direction. Type and options
//! are kept.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::events::MfaToggled;
use crate::mfa::strategy::MfaStrategyRegistry;
use crate::shared::UserLocks;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::{MfaState, MfaType, User, UserStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMfaCommand {
    pub user_id: String,
    pub domain_id: String,
    pub verify_code: String,
}

pub struct ConfirmMfaUseCase<U: UnitOfWork> {
    users: Arc<dyn UserStore>,
    strategies: Arc<MfaStrategyRegistry>,
    locks: Arc<UserLocks>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> ConfirmMfaUseCase<U> {
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

    pub async fn execute(&self, command: ConfirmMfaCommand, ctx: ExecutionContext) -> UseCaseResult<User> {
        let _guard = self.locks.lock(&command.domain_id, &command.user_id).await;

        let (user, mfa_type, previous) = match self.toggle(&command).await {
            Ok(toggled) => toggled,
            Err(e) => {
                debug!(user_id = %command.user_id, code = e.code(), "MFA confirm rejected");
                return UseCaseResult::failure(e);
            }
        };

        let event = MfaToggled::new(&ctx, &user, mfa_type, previous);
        let committed = self.unit_of_work.commit(&user, event, &command).await;

        if committed.is_success() {
            info!(
                user_id = %user.user_id,
                from = ?previous,
                to = ?user.mfa_state(),
                "MFA state toggled"
            );
        }
        committed.map(|_| user)
    }

    async fn toggle(&self, command: &ConfirmMfaCommand) -> Result<(User, MfaType, MfaState), UseCaseError> {
        let mut user = self
            .users
            .find(&command.user_id, &command.domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&command.user_id, &command.domain_id))?;

        let mfa_type = user
            .mfa_type()
            .ok_or_else(|| UseCaseError::mfa_not_enabled(&user.user_id))?;

        let strategy = self.strategies.resolve(mfa_type)?;
        if !strategy.verify(&user, &command.verify_code).await? {
            return Err(UseCaseError::invalid_verify_code(&command.verify_code));
        }

        let previous = user.mfa_state();
        if let Some(mfa) = user.mfa.as_mut() {
            mfa.state = previous.toggled();
        }
        Ok((user, mfa_type, previous))
    }
}
