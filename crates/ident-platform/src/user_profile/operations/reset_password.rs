//! Reset Password Use Case
//!
//! Two modes, chosen by configuration:
//! - `ACCESS_TOKEN`: email a console link carrying a temporary token
//! - `PASSWORD`: store a generated password and email it; the user must
//!   change it at next sign-in

use ident_config::{EmailConfig, ResetPasswordConfig, ResetPasswordMode, TokenConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::events::PasswordReset;
use crate::domain::DomainStore;
use crate::notify::{messages, EmailMessage, Notifier};
use crate::password::{PasswordGenerator, PasswordService};
use crate::shared::UserLocks;
use crate::token::TokenIssuer;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::{AuthType, RequiredAction, User, UserStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordCommand {
    pub user_id: String,
    pub domain_id: String,
}

/// Configuration sections the flow reads.
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordSettings {
    pub token: TokenConfig,
    pub reset_password: ResetPasswordConfig,
    pub email: EmailConfig,
}

/// Collaborators producing the credential that gets mailed.
pub struct ResetCredentials {
    pub tokens: Arc<dyn TokenIssuer>,
    pub generator: Arc<dyn PasswordGenerator>,
    pub passwords: Arc<PasswordService>,
}

pub struct ResetPasswordUseCase<U: UnitOfWork> {
    users: Arc<dyn UserStore>,
    domains: Arc<dyn DomainStore>,
    credentials: ResetCredentials,
    notifier: Arc<dyn Notifier>,
    settings: ResetPasswordSettings,
    locks: Arc<UserLocks>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> ResetPasswordUseCase<U> {
    pub fn new(
        users: Arc<dyn UserStore>,
        domains: Arc<dyn DomainStore>,
        credentials: ResetCredentials,
        notifier: Arc<dyn Notifier>,
        settings: ResetPasswordSettings,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            users,
            domains,
            credentials,
            notifier,
            settings,
            locks,
            unit_of_work,
        }
    }

    pub async fn execute(&self, command: ResetPasswordCommand, ctx: ExecutionContext) -> UseCaseResult<()> {
        let _guard = self.locks.lock(&command.domain_id, &command.user_id).await;
        let mode = self.settings.reset_password.mode;

        let (user, message) = match self.prepare(&command, mode).await {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!(user_id = %command.user_id, code = e.code(), "Password reset rejected");
                return UseCaseResult::failure(e);
            }
        };

        let event = PasswordReset::new(&ctx, &user, mode);
        if let Err(e) = self.unit_of_work.commit(&user, event, &command).await.into_result() {
            return UseCaseResult::failure(e);
        }

        let sent = self.notifier.send(message).await.map_err(UseCaseError::from);
        if sent.is_ok() {
            info!(user_id = %user.user_id, mode = ?mode, "Password reset sent");
        }
        UseCaseResult::from_read(sent)
    }

    /// Check the account, produce the credential and the email carrying it.
    async fn prepare(
        &self,
        command: &ResetPasswordCommand,
        mode: ResetPasswordMode,
    ) -> Result<(User, EmailMessage), UseCaseError> {
        let mut user = self
            .users
            .find(&command.user_id, &command.domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&command.user_id, &command.domain_id))?;

        if user.auth_type == AuthType::External {
            return Err(UseCaseError::unable_to_reset_password_in_external_auth(&user.user_id));
        }
        let email = user
            .email
            .clone()
            .filter(|email| !email.is_empty())
            .ok_or_else(|| UseCaseError::unable_to_reset_password_without_email(&user.user_id))?;
        if !user.email_verified {
            return Err(UseCaseError::verification_unavailable(&user.user_id));
        }

        let domain = self
            .domains
            .find(&user.domain_id)
            .await?
            .ok_or_else(|| UseCaseError::domain_not_found(&user.domain_id))?;
        let console_url = self.settings.email.console_url(&domain.name);

        let message = match mode {
            ResetPasswordMode::AccessToken => {
                let token = self
                    .credentials
                    .tokens
                    .issue_temporary_token(&user, self.settings.token.temporary_token_timeout_secs)
                    .await?;
                let reset_url = format!("{}?sso_access_token={}", console_url, token);
                messages::reset_password_link(&email, &user.user_id, &reset_url)
            }
            ResetPasswordMode::Password => {
                let temporary = self
                    .credentials
                    .generator
                    .generate(self.settings.reset_password.temporary_password_length);
                user.password = Some(self.credentials.passwords.hash(&temporary)?);
                user.require_action(RequiredAction::UpdatePassword);
                messages::temporary_password(&email, &user.user_id, &temporary, &console_url)
            }
        };

        Ok((user, message))
    }
}
