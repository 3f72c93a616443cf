//! Event and audit records written by the unit of work.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain_event::DomainEvent;
use crate::shared::tsid::TsidGenerator;

pub const EVENTS_COLLECTION: &str = "events";
pub const AUDIT_LOGS_COLLECTION: &str = "audit_logs";

/// Stored form of a domain event (CloudEvents-shaped).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub subject: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub time: DateTime<Utc>,
    pub data: serde_json::Value,
    pub spec_version: String,
    pub message_group: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    pub principal_id: String,
}

impl StoredEvent {
    pub fn from_event<E: DomainEvent>(event: &E) -> Self {
        let meta = event.metadata().clone();
        Self {
            id: meta.event_id,
            event_type: meta.event_type,
            source: meta.source,
            subject: meta.subject,
            time: meta.time,
            data: event.data(),
            spec_version: meta.spec_version,
            message_group: meta.message_group,
            correlation_id: meta.correlation_id,
            causation_id: meta.causation_id,
            principal_id: meta.principal_id,
        }
    }
}

/// One audit entry per committed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    #[serde(rename = "_id")]
    pub id: String,

    /// e.g. "RoleBinding", "User"
    pub entity_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// Command type name, e.g. "CreateRoleBindingCommand"
    pub operation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_json: Option<String>,

    pub principal_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub performed_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn from_command<E: DomainEvent, C: Serialize>(event: &E, command: &C) -> Self {
        let operation = std::any::type_name::<C>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string();

        Self {
            id: TsidGenerator::generate(),
            entity_type: entity_type_from_subject(event.subject()),
            entity_id: event.subject().splitn(3, '.').nth(2).map(String::from),
            operation,
            operation_json: serde_json::to_string(command).ok(),
            principal_id: event.principal_id().to_string(),
            performed_at: event.metadata().time,
        }
    }
}

/// `identity.role_binding.rb-1` -> `RoleBinding`
fn entity_type_from_subject(subject: &str) -> String {
    match subject.split('.').nth(1) {
        Some(aggregate) if !aggregate.is_empty() => aggregate
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect(),
        _ => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_from_subject() {
        assert_eq!(entity_type_from_subject("identity.role_binding.rb-1"), "RoleBinding");
        assert_eq!(entity_type_from_subject("identity.user.0HZXEQ5Y8JY5Z"), "User");
        assert_eq!(entity_type_from_subject(""), "Unknown");
    }
}
