//! Email-code MFA strategy

use async_trait::async_trait;
use ident_config::MfaConfig;
use std::sync::Arc;
use tracing::info;

use super::strategy::MfaStrategy;
use super::verify_code::{generate_code, CodePurpose, VerifyCodeStore};
use crate::notify::{messages, Notifier};
use crate::usecase::UseCaseError;
use crate::user::{MfaOptions, MfaType, User};

/// Option naming the address codes go to.
pub const EMAIL_OPTION: &str = "email";

pub struct EmailMfaStrategy {
    codes: Arc<dyn VerifyCodeStore>,
    notifier: Arc<dyn Notifier>,
    config: MfaConfig,
}

impl EmailMfaStrategy {
    pub fn new(codes: Arc<dyn VerifyCodeStore>, notifier: Arc<dyn Notifier>, config: MfaConfig) -> Self {
        Self {
            codes,
            notifier,
            config,
        }
    }

    async fn send_code(&self, user: &User, to: &str) -> Result<(), UseCaseError> {
        let code = generate_code(self.config.verify_code_length);
        let key = CodePurpose::Mfa.key(&user.domain_id, &user.user_id);
        self.codes
            .issue(&key, &code, self.config.verify_code_ttl_secs)
            .await?;
        self.notifier
            .send(messages::mfa_verify_code(
                to,
                &user.user_id,
                &code,
                self.config.verify_code_ttl_secs,
            ))
            .await?;
        info!(user_id = %user.user_id, "MFA code sent");
        Ok(())
    }
}

fn target<'a>(user: &'a User, options: &'a MfaOptions) -> Result<&'a str, UseCaseError> {
    options
        .get(EMAIL_OPTION)
        .or(user.email.as_ref())
        .map(String::as_str)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| UseCaseError::required_parameter("options.email"))
}

#[async_trait]
impl MfaStrategy for EmailMfaStrategy {
    fn mfa_type(&self) -> MfaType {
        MfaType::Email
    }

    async fn enroll(&self, user: &User, options: &MfaOptions) -> Result<(), UseCaseError> {
        let to = target(user, options)?;
        self.send_code(user, to).await
    }

    async fn send_disable_notice(&self, user: &User) -> Result<(), UseCaseError> {
        let empty = MfaOptions::new();
        let options = user.mfa.as_ref().map(|m| &m.options).unwrap_or(&empty);
        let to = target(user, options)?;
        self.send_code(user, to).await
    }

    async fn verify(&self, user: &User, verify_code: &str) -> Result<bool, UseCaseError> {
        let key = CodePurpose::Mfa.key(&user.domain_id, &user.user_id);
        Ok(self.codes.consume(&key, verify_code).await?)
    }
}
