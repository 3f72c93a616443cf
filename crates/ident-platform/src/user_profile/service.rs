//! User Profile Service
//!
//! Facade over the profile and MFA use cases. Every operation acts on the
//! calling account; `reset_password` is public and names the account itself.

use ident_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::operations::{
    ConfirmEmailCommand, ConfirmEmailUseCase, ResetCredentials, ResetPasswordCommand,
    ResetPasswordSettings, ResetPasswordUseCase, UpdateProfileCommand, UpdateProfileUseCase,
    UserProfileQueries, VerifyEmailCommand, VerifyEmailUseCase,
};
use crate::bootstrap::Stores;
use crate::handler::descriptor::{
    USER_PROFILE_CONFIRM_EMAIL, USER_PROFILE_CONFIRM_MFA, USER_PROFILE_DISABLE_MFA,
    USER_PROFILE_ENABLE_MFA, USER_PROFILE_GET, USER_PROFILE_GET_WORKSPACES,
    USER_PROFILE_RESET_PASSWORD, USER_PROFILE_UPDATE, USER_PROFILE_VERIFY_EMAIL,
};
use crate::handler::{Caller, HandlerChain};
use crate::mfa::operations::{
    ConfirmMfaCommand, ConfirmMfaUseCase, DisableMfaCommand, DisableMfaUseCase, EnableMfaCommand,
    EnableMfaUseCase,
};
use crate::mfa::MfaStrategyRegistry;
use crate::notify::Notifier;
use crate::password::{PasswordGenerator, PasswordService};
use crate::shared::pagination::PageResult;
use crate::shared::UserLocks;
use crate::token::TokenIssuer;
use crate::usecase::{UnitOfWork, UseCaseResult};
use crate::user::{MfaOptions, UserInfo};
use crate::workspace::Workspace;

/// Collaborators of the profile flows.
#[derive(Clone)]
pub struct ProfileCollaborators {
    pub notifier: Arc<dyn Notifier>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub generator: Arc<dyn PasswordGenerator>,
    pub passwords: Arc<PasswordService>,
    pub strategies: Arc<MfaStrategyRegistry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableMfaRequest {
    pub mfa_type: String,
    #[serde(default)]
    pub options: MfaOptions,
}

pub struct UserProfileService<U: UnitOfWork> {
    chain: Arc<HandlerChain>,
    update: UpdateProfileUseCase<U>,
    verify_email: VerifyEmailUseCase<U>,
    confirm_email: ConfirmEmailUseCase<U>,
    reset_password: ResetPasswordUseCase<U>,
    enable_mfa: EnableMfaUseCase<U>,
    disable_mfa: DisableMfaUseCase,
    confirm_mfa: ConfirmMfaUseCase<U>,
    queries: UserProfileQueries,
}

impl<U: UnitOfWork> UserProfileService<U> {
    pub fn new(
        stores: &Stores,
        collaborators: ProfileCollaborators,
        config: &AppConfig,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
        chain: Arc<HandlerChain>,
    ) -> Self {
        let ProfileCollaborators {
            notifier,
            tokens,
            generator,
            passwords,
            strategies,
        } = collaborators;

        Self {
            chain,
            update: UpdateProfileUseCase::new(
                stores.users.clone(),
                passwords.clone(),
                locks.clone(),
                unit_of_work.clone(),
            ),
            verify_email: VerifyEmailUseCase::new(
                stores.users.clone(),
                stores.verify_codes.clone(),
                notifier.clone(),
                config.mfa.clone(),
                locks.clone(),
                unit_of_work.clone(),
            ),
            confirm_email: ConfirmEmailUseCase::new(
                stores.users.clone(),
                stores.verify_codes.clone(),
                locks.clone(),
                unit_of_work.clone(),
            ),
            reset_password: ResetPasswordUseCase::new(
                stores.users.clone(),
                stores.domains.clone(),
                ResetCredentials {
                    tokens,
                    generator,
                    passwords,
                },
                notifier,
                ResetPasswordSettings {
                    token: config.token.clone(),
                    reset_password: config.reset_password.clone(),
                    email: config.email.clone(),
                },
                locks.clone(),
                unit_of_work.clone(),
            ),
            enable_mfa: EnableMfaUseCase::new(
                stores.users.clone(),
                strategies.clone(),
                locks.clone(),
                unit_of_work.clone(),
            ),
            disable_mfa: DisableMfaUseCase::new(stores.users.clone(), strategies.clone(), locks.clone()),
            confirm_mfa: ConfirmMfaUseCase::new(stores.users.clone(), strategies, locks, unit_of_work),
            queries: UserProfileQueries::new(
                stores.users.clone(),
                stores.workspaces.clone(),
                stores.role_bindings.clone(),
            ),
        }
    }

    pub async fn update(&self, caller: Option<Caller>, request: UpdateProfileRequest) -> UseCaseResult<UserInfo> {
        self.chain
            .run(&USER_PROFILE_UPDATE, caller, |inv| async move {
                let scope = match inv.scope() {
                    Ok(scope) => scope.clone(),
                    Err(e) => return UseCaseResult::failure(e),
                };
                let command = UpdateProfileCommand {
                    user_id: scope.user_id,
                    domain_id: scope.domain_id,
                    password: request.password,
                    name: request.name,
                    email: request.email,
                    language: request.language,
                    timezone: request.timezone,
                    tags: request.tags,
                };
                self.update.execute(command, inv.context).await.map(UserInfo::from)
            })
            .await
    }

    pub async fn verify_email(&self, caller: Option<Caller>, email: Option<String>) -> UseCaseResult<()> {
        self.chain
            .run(&USER_PROFILE_VERIFY_EMAIL, caller, |inv| async move {
                let scope = match inv.scope() {
                    Ok(scope) => scope.clone(),
                    Err(e) => return UseCaseResult::failure(e),
                };
                let command = VerifyEmailCommand {
                    user_id: scope.user_id,
                    domain_id: scope.domain_id,
                    email,
                };
                self.verify_email.execute(command, inv.context).await
            })
            .await
    }

    pub async fn confirm_email(&self, caller: Option<Caller>, verify_code: &str) -> UseCaseResult<UserInfo> {
        self.chain
            .run(&USER_PROFILE_CONFIRM_EMAIL, caller, |inv| async move {
                let scope = match inv.scope() {
                    Ok(scope) => scope.clone(),
                    Err(e) => return UseCaseResult::failure(e),
                };
                let command = ConfirmEmailCommand {
                    user_id: scope.user_id,
                    domain_id: scope.domain_id,
                    verify_code: verify_code.to_string(),
                };
                self.confirm_email.execute(command, inv.context).await.map(UserInfo::from)
            })
            .await
    }

    /// Public; no caller is required.
    pub async fn reset_password(&self, user_id: &str, domain_id: &str) -> UseCaseResult<()> {
        self.chain
            .run(&USER_PROFILE_RESET_PASSWORD, None, |inv| async move {
                let command = ResetPasswordCommand {
                    user_id: user_id.to_string(),
                    domain_id: domain_id.to_string(),
                };
                self.reset_password.execute(command, inv.context).await
            })
            .await
    }

    pub async fn enable_mfa(&self, caller: Option<Caller>, request: EnableMfaRequest) -> UseCaseResult<UserInfo> {
        self.chain
            .run(&USER_PROFILE_ENABLE_MFA, caller, |inv| async move {
                let scope = match inv.scope() {
                    Ok(scope) => scope.clone(),
                    Err(e) => return UseCaseResult::failure(e),
                };
                let command = EnableMfaCommand {
                    user_id: scope.user_id,
                    domain_id: scope.domain_id,
                    mfa_type: request.mfa_type,
                    options: request.options,
                };
                self.enable_mfa.execute(command, inv.context).await.map(UserInfo::from)
            })
            .await
    }

    pub async fn disable_mfa(&self, caller: Option<Caller>) -> UseCaseResult<UserInfo> {
        self.chain
            .run(&USER_PROFILE_DISABLE_MFA, caller, |inv| async move {
                let scope = match inv.scope() {
                    Ok(scope) => scope.clone(),
                    Err(e) => return UseCaseResult::failure(e),
                };
                let command = DisableMfaCommand {
                    user_id: scope.user_id,
                    domain_id: scope.domain_id,
                };
                self.disable_mfa.execute(command, inv.context).await.map(UserInfo::from)
            })
            .await
    }

    pub async fn confirm_mfa(&self, caller: Option<Caller>, verify_code: &str) -> UseCaseResult<UserInfo> {
        self.chain
            .run(&USER_PROFILE_CONFIRM_MFA, caller, |inv| async move {
                let scope = match inv.scope() {
                    Ok(scope) => scope.clone(),
                    Err(e) => return UseCaseResult::failure(e),
                };
                let command = ConfirmMfaCommand {
                    user_id: scope.user_id,
                    domain_id: scope.domain_id,
                    verify_code: verify_code.to_string(),
                };
                self.confirm_mfa.execute(command, inv.context).await.map(UserInfo::from)
            })
            .await
    }

    pub async fn get(&self, caller: Option<Caller>) -> UseCaseResult<UserInfo> {
        self.chain
            .run(&USER_PROFILE_GET, caller, |inv| async move {
                match inv.scope() {
                    Ok(scope) => self
                        .queries
                        .get(&scope.user_id, &scope.domain_id)
                        .await
                        .map(UserInfo::from),
                    Err(e) => UseCaseResult::failure(e),
                }
            })
            .await
    }

    pub async fn get_workspaces(&self, caller: Option<Caller>) -> UseCaseResult<PageResult<Workspace>> {
        self.chain
            .run(&USER_PROFILE_GET_WORKSPACES, caller, |inv| async move {
                match inv.scope() {
                    Ok(scope) => self.queries.get_workspaces(&scope.user_id, &scope.domain_id).await,
                    Err(e) => UseCaseResult::failure(e),
                }
            })
            .await
    }
}
