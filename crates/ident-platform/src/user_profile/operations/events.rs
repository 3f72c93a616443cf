//! User Profile Domain Events

use ident_config::ResetPasswordMode;
use serde::{Deserialize, Serialize};

use crate::impl_domain_event;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;
use crate::user::User;

const AGGREGATE: &str = "user";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub domain_id: String,
    /// Names of the changed fields; values are not recorded
    pub changed_fields: Vec<String>,
}

impl_domain_event!(ProfileUpdated);

impl ProfileUpdated {
    const EVENT_TYPE: &'static str = "identity:user:profile_updated";

    pub fn new(ctx: &ExecutionContext, user: &User, changed_fields: Vec<String>) -> Self {
        Self {
            metadata: EventMetadata::for_aggregate(ctx, Self::EVENT_TYPE, AGGREGATE, &user.id),
            user_id: user.user_id.clone(),
            domain_id: user.domain_id.clone(),
            changed_fields,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerified {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub domain_id: String,
    pub email: Option<String>,
}

impl_domain_event!(EmailVerified);

impl EmailVerified {
    const EVENT_TYPE: &'static str = "identity:user:email_verified";

    pub fn new(ctx: &ExecutionContext, user: &User) -> Self {
        Self {
            metadata: EventMetadata::for_aggregate(ctx, Self::EVENT_TYPE, AGGREGATE, &user.id),
            user_id: user.user_id.clone(),
            domain_id: user.domain_id.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub domain_id: String,
    pub mode: ResetPasswordMode,
}

impl_domain_event!(PasswordReset);

impl PasswordReset {
    const EVENT_TYPE: &'static str = "identity:user:password_reset";

    pub fn new(ctx: &ExecutionContext, user: &User, mode: ResetPasswordMode) -> Self {
        Self {
            metadata: EventMetadata::for_aggregate(ctx, Self::EVENT_TYPE, AGGREGATE, &user.id),
            user_id: user.user_id.clone(),
            domain_id: user.domain_id.clone(),
            mode,
        }
    }
}
