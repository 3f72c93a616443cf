//! MFA Domain Events

use serde::{Deserialize, Serialize};

use crate::impl_domain_event;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;
use crate::user::{MfaOptions, MfaState, MfaType, User};

const AGGREGATE: &str = "user";

/// A second factor was configured; it stays `DISABLED` until confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaEnrolled {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub domain_id: String,
    pub mfa_type: MfaType,
    pub options: MfaOptions,
}

impl_domain_event!(MfaEnrolled);

impl MfaEnrolled {
    const EVENT_TYPE: &'static str = "identity:user:mfa_enrolled";

    pub fn new(ctx: &ExecutionContext, user: &User, mfa_type: MfaType, options: &MfaOptions) -> Self {
        Self {
            metadata: EventMetadata::for_aggregate(ctx, Self::EVENT_TYPE, AGGREGATE, &user.id),
            user_id: user.user_id.clone(),
            domain_id: user.domain_id.clone(),
            mfa_type,
            options: options.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaToggled {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub domain_id: String,
    pub mfa_type: MfaType,
    pub previous_state: MfaState,
    pub state: MfaState,
}

impl_domain_event!(MfaToggled);

impl MfaToggled {
    const EVENT_TYPE: &'static str = "identity:user:mfa_toggled";

    pub fn new(
        ctx: &ExecutionContext,
        user: &User,
        mfa_type: MfaType,
        previous_state: MfaState,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_aggregate(ctx, Self::EVENT_TYPE, AGGREGATE, &user.id),
            user_id: user.user_id.clone(),
            domain_id: user.domain_id.clone(),
            mfa_type,
            previous_state,
            state: user.mfa_state(),
        }
    }
}
