//! Domain Event Trait
//!
//! Every successful mutation emits one event describing what happened, in
//! past tense. Events are stored by the unit of work next to the state change.
//!
//! - Event type: `identity:{aggregate}:{action}`, e.g. `identity:role_binding:created`
//! - Subject: `identity.{aggregate}.{id}`
//! - Message group: `identity:{aggregate}:{id}`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ExecutionContext;
use crate::shared::tsid::TsidGenerator;

pub const EVENT_SOURCE: &str = "identity";
pub const EVENT_SPEC_VERSION: &str = "1.0";

/// An event carries its envelope in an `EventMetadata`; everything else it
/// serialises is the payload.
pub trait DomainEvent: Serialize + Send + Sync {
    fn metadata(&self) -> &EventMetadata;

    fn event_id(&self) -> &str {
        &self.metadata().event_id
    }

    fn event_type(&self) -> &str {
        &self.metadata().event_type
    }

    /// Qualified aggregate identifier: `identity.{aggregate}.{id}`
    fn subject(&self) -> &str {
        &self.metadata().subject
    }

    fn principal_id(&self) -> &str {
        &self.metadata().principal_id
    }

    /// Payload with the envelope fields stripped.
    fn data(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(fields) = value.as_object_mut() {
            for key in EventMetadata::ENVELOPE_FIELDS {
                fields.remove(*key);
            }
        }
        value
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub event_id: String,
    pub event_type: String,
    pub spec_version: String,
    pub source: String,
    pub subject: String,
    pub time: DateTime<Utc>,
    pub execution_id: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    pub principal_id: String,
    pub message_group: String,
}

impl EventMetadata {
    /// Serialised names of the fields above, as they appear when flattened.
    pub const ENVELOPE_FIELDS: &'static [&'static str] = &[
        "eventId",
        "eventType",
        "specVersion",
        "source",
        "subject",
        "time",
        "executionId",
        "correlationId",
        "causationId",
        "principalId",
        "messageGroup",
    ];

    /// Metadata for an event about `{aggregate}` `{aggregate_id}`, tracing fields from `ctx`.
    pub fn for_aggregate(
        ctx: &ExecutionContext,
        event_type: &str,
        aggregate: &str,
        aggregate_id: &str,
    ) -> Self {
        Self {
            event_id: TsidGenerator::generate(),
            event_type: event_type.to_string(),
            spec_version: EVENT_SPEC_VERSION.to_string(),
            source: EVENT_SOURCE.to_string(),
            subject: format!("{}.{}.{}", EVENT_SOURCE, aggregate, aggregate_id),
            time: Utc::now(),
            execution_id: ctx.execution_id.clone(),
            correlation_id: ctx.correlation_id.clone(),
            causation_id: ctx.causation_id.clone(),
            principal_id: ctx.principal_id.clone(),
            message_group: format!("{}:{}:{}", EVENT_SOURCE, aggregate, aggregate_id),
        }
    }
}

/// Implement `DomainEvent` for a struct with a flattened `metadata` field.
#[macro_export]
macro_rules! impl_domain_event {
    ($event_type:ty) => {
        impl $crate::usecase::DomainEvent for $event_type {
            fn metadata(&self) -> &$crate::usecase::EventMetadata {
                &self.metadata
            }
        }
    };
}
