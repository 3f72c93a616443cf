//! User Entity
//!
//! A domain member. `role_type` is derived from the user's role bindings and
//! `mfa` holds the second-factor enrollment.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::role::RoleType;
use crate::shared::tsid::TsidGenerator;
use crate::usecase::HasId;

/// Account lifecycle status, independent of MFA state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserState {
    Pending,
    #[default]
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthType {
    /// Password held by this platform
    #[default]
    Local,
    /// Authenticated by an external identity provider
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequiredAction {
    UpdatePassword,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MfaState {
    Enabled,
    #[default]
    Disabled,
}

impl MfaState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Enabled => Self::Disabled,
            Self::Disabled => Self::Enabled,
        }
    }
}

/// Second-factor kinds. A kind is usable only once a strategy is registered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MfaType {
    Email,
    Otp,
}

impl MfaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Otp => "OTP",
        }
    }
}

impl std::str::FromStr for MfaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL" => Ok(Self::Email),
            "OTP" => Ok(Self::Otp),
            other => Err(format!("unknown MFA type '{}'", other)),
        }
    }
}

pub type MfaOptions = BTreeMap<String, String>;

/// MFA sub-record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaSettings {
    #[serde(default)]
    pub state: MfaState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfa_type: Option<MfaType>,

    /// Strategy-specific settings, e.g. `email` for the email strategy
    #[serde(default)]
    pub options: MfaOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Unique within the domain
    pub user_id: String,

    pub domain_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub email_verified: bool,

    #[serde(default)]
    pub auth_type: AuthType,

    /// Argon2id PHC string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default)]
    pub role_type: RoleType,

    #[serde(default)]
    pub state: UserState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfa: Option<MfaSettings>,

    #[serde(default)]
    pub required_actions: Vec<RequiredAction>,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional"
    )]
    pub last_accessed_at: Option<DateTime<Utc>>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl User {
    pub fn new(user_id: impl Into<String>, domain_id: impl Into<String>) -> Self {
        Self {
            id: TsidGenerator::generate(),
            user_id: user_id.into(),
            domain_id: domain_id.into(),
            name: String::new(),
            email: None,
            email_verified: false,
            auth_type: AuthType::Local,
            password: None,
            role_type: RoleType::User,
            state: UserState::Enabled,
            mfa: None,
            required_actions: Vec::new(),
            language: default_language(),
            timezone: default_timezone(),
            tags: BTreeMap::new(),
            created_at: Utc::now(),
            last_accessed_at: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>, verified: bool) -> Self {
        self.email = Some(email.into());
        self.email_verified = verified;
        self
    }

    pub fn with_role_type(mut self, role_type: RoleType) -> Self {
        self.role_type = role_type;
        self
    }

    pub fn with_auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = auth_type;
        self
    }

    /// MFA state, `DISABLED` when no sub-record exists.
    pub fn mfa_state(&self) -> MfaState {
        self.mfa.as_ref().map(|m| m.state).unwrap_or_default()
    }

    pub fn mfa_type(&self) -> Option<MfaType> {
        self.mfa.as_ref().and_then(|m| m.mfa_type)
    }

    pub fn require_action(&mut self, action: RequiredAction) {
        if !self.required_actions.contains(&action) {
            self.required_actions.push(action);
        }
    }
}

impl HasId for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "users"
    }
}

/// Outward view of a user; the password hash is left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo {
    pub user_id: String,
    pub domain_id: String,
    pub name: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub auth_type: AuthType,
    pub role_type: RoleType,
    pub state: UserState,
    pub mfa: Option<MfaSettings>,
    pub required_actions: Vec<RequiredAction>,
    pub language: String,
    pub timezone: String,
    pub tags: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            domain_id: user.domain_id,
            name: user.name,
            email: user.email,
            email_verified: user.email_verified,
            auth_type: user.auth_type,
            role_type: user.role_type,
            state: user.state,
            mfa: user.mfa,
            required_actions: user.required_actions,
            language: user.language,
            timezone: user.timezone,
            tags: user.tags,
            created_at: user.created_at,
            last_accessed_at: user.last_accessed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("alice", "d-1");
        assert_eq!(user.role_type, RoleType::User);
        assert_eq!(user.mfa_state(), MfaState::Disabled);
        assert!(user.mfa_type().is_none());
        assert_eq!(user.language, "en");
        assert_eq!(user.timezone, "UTC");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let doc = bson::doc! {
            "_id": "0HZXEQ5Y8JY5Z",
            "userId": "bob",
            "domainId": "d-1",
            "createdAt": bson::DateTime::now(),
        };
        let user: User = bson::from_document(doc).unwrap();
        assert_eq!(user.role_type, RoleType::User);
        assert_eq!(user.state, UserState::Enabled);
        assert_eq!(user.auth_type, AuthType::Local);
        assert!(user.required_actions.is_empty());
        assert_eq!(user.timezone, "UTC");
    }

    #[test]
    fn test_user_info_omits_password() {
        let mut user = User::new("alice", "d-1");
        user.password = Some("$argon2id$v=19$secret".to_string());
        let json = serde_json::to_string(&UserInfo::from(user)).unwrap();
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_require_action_is_idempotent() {
        let mut user = User::new("alice", "d-1");
        user.require_action(RequiredAction::UpdatePassword);
        user.require_action(RequiredAction::UpdatePassword);
        assert_eq!(user.required_actions, vec![RequiredAction::UpdatePassword]);
    }

    #[test]
    fn test_mfa_state_toggle() {
        assert_eq!(MfaState::Enabled.toggled(), MfaState::Disabled);
        assert_eq!(MfaState::Disabled.toggled(), MfaState::Enabled);
    }
}
