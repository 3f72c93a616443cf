//! Update Profile Use Case

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use super::events::ProfileUpdated;
use crate::password::PasswordService;
use crate::shared::UserLocks;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::{RequiredAction, User, UserStore};

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok())
        .as_ref()
}

pub(crate) fn check_email(email: &str) -> Result<(), UseCaseError> {
    if email_pattern().is_some_and(|p| p.is_match(email)) {
        Ok(())
    } else {
        Err(UseCaseError::invalid_email(email))
    }
}

/// Only the supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileCommand {
    pub user_id: String,
    pub domain_id: String,
    /// Never written to the audit log
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

pub struct UpdateProfileUseCase<U: UnitOfWork> {
    users: Arc<dyn UserStore>,
    passwords: Arc<PasswordService>,
    locks: Arc<UserLocks>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> UpdateProfileUseCase<U> {
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: Arc<PasswordService>,
        locks: Arc<UserLocks>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            users,
            passwords,
            locks,
            unit_of_work,
        }
    }

    pub async fn execute(&self, command: UpdateProfileCommand, ctx: ExecutionContext) -> UseCaseResult<User> {
        let _guard = self.locks.lock(&command.domain_id, &command.user_id).await;

        let (user, changed) = match self.apply(&command).await {
            Ok(updated) => updated,
            Err(e) => {
                debug!(user_id = %command.user_id, code = e.code(), "Profile update rejected");
                return UseCaseResult::failure(e);
            }
        };

        let event = ProfileUpdated::new(&ctx, &user, changed.clone());
        let committed = self.unit_of_work.commit(&user, event, &command).await;
        if committed.is_success() {
            info!(user_id = %user.user_id, changed = ?changed, "Profile updated");
        }
        committed.map(|_| user)
    }

    async fn apply(&self, command: &UpdateProfileCommand) -> Result<(User, Vec<String>), UseCaseError> {
        let mut user = self
            .users
            .find(&command.user_id, &command.domain_id)
            .await?
            .ok_or_else(|| UseCaseError::user_not_found(&command.user_id, &command.domain_id))?;
        let mut changed = Vec::new();

        if let Some(password) = &command.password {
            self.passwords.validate(password)?;
            user.password = Some(self.passwords.hash(password)?);
            user.required_actions.retain(|a| *a != RequiredAction::UpdatePassword);
            changed.push("password".to_string());
        }
        if let Some(name) = &command.name {
            user.name = name.clone();
            changed.push("name".to_string());
        }
        if let Some(email) = &command.email {
            check_email(email)?;
            if user.email.as_deref() != Some(email.as_str()) {
                user.email = Some(email.clone());
                user.email_verified = false;
                changed.push("email".to_string());
            }
        }
        if let Some(language) = &command.language {
            user.language = language.clone();
            changed.push("language".to_string());
        }
        if let Some(timezone) = &command.timezone {
            user.timezone = timezone.clone();
            changed.push("timezone".to_string());
        }
        if let Some(tags) = &command.tags {
            user.tags = tags.clone();
            changed.push("tags".to_string());
        }

        Ok((user, changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_email() {
        assert!(check_email("alice@example.com").is_ok());
        assert_eq!(check_email("alice@").unwrap_err().code(), "INVALID_EMAIL");
    }

    #[test]
    fn test_password_not_serialized() {
        let command = UpdateProfileCommand {
            user_id: "alice".to_string(),
            domain_id: "d-1".to_string(),
            password: Some("s3cretpass".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&command).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["userId"], "alice");
    }
}
