//! Verify Email Use Case
//!
//! Marks the address unverified and mails a confirmation code for it.

use ident_config::MfaConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::events::ProfileUpdated;
use super::update::check_email;
use crate::mfa::verify_code::{generate_code, CodePurpose, VerifyCodeStore};
use crate::notify::{messages, Notifier};
use crate::shared::UserLocks;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::{User, UserStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailCommand {
    pub user_id: String,
    pub domain_id: String,
    /// Replaces the stored address when given
    #[serde(default)]
    pub email: Option<String>,
}

pub struct VerifyEmailUseCase<U: UnitOfWork> {
    users: Arc<dyn UserStore>,
    codes: Arc<dyn VerifyCodeStore>,
    notifier: Arc<dyn Notifier>,
    config: MfaConfig,
    locks: Arc<UserLocks>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> VerifyEmailUseCase<U> {
    pub fn new(
        users: Arc<dyn UserStore>,
        codes: Arc<dyn VerifyCodeStore>,
        notifier: Arc<dyn Notifier>,
        config: MfaConfig,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            users,
            codes,
            notifier,
            config,
            locks,
            unit_of_work,
        }
    }

    pub async fn execute(&self, command: VerifyEmailCommand, ctx: ExecutionContext) -> UseCaseResult<()> {
        let _guard = self.locks.lock(&command.domain_id, &command.user_id).await;

        let (user, email) = match self.prepare(&command).await {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!(user_id = %command.user_id, code = e.code(), "Email verification rejected");
                return UseCaseResult::failure(e);
            }
        };

        let changed = vec!["email".to_string(), "emailVerified".to_string()];
        let event = ProfileUpdated::new(&ctx, &user, changed);
        if let Err(e) = self.unit_of_work.commit(&user, event, &command).await.into_result() {
            return UseCaseResult::failure(e);
        }

        let sent = self.send_code(&user, &email).await;
        if sent.is_ok() {
            info!(user_id = %user.user_id, "Email verification code sent");
        }
        UseCaseResult::from_read(sent)
    }

    async fn prepare(&self, command: &VerifyEmailCommand) -> Result<(User, String), UseCaseError> {
        let mut user = self
            .users
            .find(&command.user_id, &command.domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&command.user_id, &command.domain_id))?;

        let email = command
            .email
            .clone()
            .or_else(|| user.email.clone())
            .filter(|email| !email.is_empty())
            .ok_or_else(|| UseCaseError::required_parameter("email"))?;
        check_email(&email)?;

        user.email = Some(email.clone());
        user.email_verified = false;
        Ok((user, email))
    }

    async fn send_code(&self, user: &User, email: &str) -> Result<(), UseCaseError> {
        let code = generate_code(self.config.verify_code_length);
        let key = CodePurpose::Email.key(&user.domain_id, &user.user_id);
        self.codes
            .issue(&key, &code, self.config.verify_code_ttl_secs)
            .await?;
        self.notifier
            .send(messages::email_verify_code(
                email,
                &user.user_id,
                &code,
                self.config.verify_code_ttl_secs,
            ))
            .await?;
        Ok(())
    }
}
