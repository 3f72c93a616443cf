//! Confirm Email Use Case

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::events::EmailVerified;
use crate::mfa::verify_code::{CodePurpose, VerifyCodeStore};
use crate::shared::UserLocks;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::{User, UserStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailCommand {
    pub user_id: String,
    pub domain_id: String,
    pub verify_code: String,
}

pub struct ConfirmEmailUseCase<U: UnitOfWork> {
    users: Arc<dyn UserStore>,
    codes: Arc<dyn VerifyCodeStore>,
    locks: Arc<UserLocks>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> ConfirmEmailUseCase<U> {
    pub fn new(
        users: Arc<dyn UserStore>,
        codes: Arc<dyn VerifyCodeStore>,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            users,
            codes,
            locks,
            unit_of_work,
        }
    }

    pub async fn execute(&self, command: ConfirmEmailCommand, ctx: ExecutionContext) -> UseCaseResult<User> {
        let _guard = self.locks.lock(&command.domain_id, &command.user_id).await;

        let user = match self.confirm(&command).await {
            Ok(user) => user,
            Err(e) => {
                debug!(user_id = %command.user_id, code = e.code(), "Email confirmation rejected");
                return UseCaseResult::failure(e);
            }
        };

        let event = EmailVerified::new(&ctx, &user);
        let committed = self.unit_of_work.commit(&user, event, &command).await;
        if committed.is_success() {
            info!(user_id = %user.user_id, "Email verified");
        }
        committed.map(|_| user)
    }

    async fn confirm(&self, command: &ConfirmEmailCommand) -> Result<User, UseCaseError> {
        let mut user = self
            .users
            .find(&command.user_id, &command.domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&command.user_id, &command.domain_id))?;

        let key = CodePurpose::Email.key(&user.domain_id, &user.user_id);
        if !self.codes.consume(&key, &command.verify_code).await? {
            return Err(UseCaseError::invalid_verify_code(&command.verify_code));
        }

        user.email_verified = true;
        Ok(user)
    }
}
