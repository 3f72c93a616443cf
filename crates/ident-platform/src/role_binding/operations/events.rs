//! Role Binding Domain Events

use serde::{Deserialize, Serialize};

use crate::impl_domain_event;
use crate::role::RoleType;
use crate::role_binding::entity::{ResourceGroup, RoleBinding};
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;

const AGGREGATE: &str = "role_binding";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBindingCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub role_binding_id: String,
    pub user_id: String,
    pub role_id: String,
    pub role_type: RoleType,
    pub resource_group: ResourceGroup,
    pub workspace_id: String,
    pub domain_id: String,
    /// User aggregate role type before and after the binding
    pub user_role_type_before: RoleType,
    pub user_role_type: RoleType,
}

impl_domain_event!(RoleBindingCreated);

impl RoleBindingCreated {
    const EVENT_TYPE: &'static str = "identity:role_binding:created";

    pub fn new(
        ctx: &ExecutionContext,
        binding: &RoleBinding,
        user_role_type_before: RoleType,
        user_role_type: RoleType,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_aggregate(
                ctx,
                Self::EVENT_TYPE,
                AGGREGATE,
                &binding.role_binding_id,
            ),
            role_binding_id: binding.role_binding_id.clone(),
            user_id: binding.user_id.clone(),
            role_id: binding.role_id.clone(),
            role_type: binding.role_type,
            resource_group: binding.resource_group,
            workspace_id: binding.workspace_id.clone(),
            domain_id: binding.domain_id.clone(),
            user_role_type_before,
            user_role_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBindingRoleChanged {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub role_binding_id: String,
    pub user_id: String,
    pub previous_role_id: String,
    pub role_id: String,
    pub role_type: RoleType,
    pub user_role_type: RoleType,
}

impl_domain_event!(RoleBindingRoleChanged);

impl RoleBindingRoleChanged {
    const EVENT_TYPE: &'static str = "identity:role_binding:role_changed";

    pub fn new(
        ctx: &ExecutionContext,
        binding: &RoleBinding,
        previous_role_id: &str,
        user_role_type: RoleType,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_aggregate(
                ctx,
                Self::EVENT_TYPE,
                AGGREGATE,
                &binding.role_binding_id,
            ),
            role_binding_id: binding.role_binding_id.clone(),
            user_id: binding.user_id.clone(),
            previous_role_id: previous_role_id.to_string(),
            role_id: binding.role_id.clone(),
            role_type: binding.role_type,
            user_role_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBindingDeleted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub role_binding_id: String,
    pub user_id: String,
    pub role_id: String,
    pub workspace_id: String,
    pub user_role_type: RoleType,
}

impl_domain_event!(RoleBindingDeleted);

impl RoleBindingDeleted {
    const EVENT_TYPE: &'static str = "identity:role_binding:deleted";

    pub fn new(ctx: &ExecutionContext, binding: &RoleBinding, user_role_type: RoleType) -> Self {
        Self {
            metadata: EventMetadata::for_aggregate(
                ctx,
                Self::EVENT_TYPE,
                AGGREGATE,
                &binding.role_binding_id,
            ),
            role_binding_id: binding.role_binding_id.clone(),
            user_id: binding.user_id.clone(),
            role_id: binding.role_id.clone(),
            workspace_id: binding.workspace_id.clone(),
            user_role_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use crate::usecase::DomainEvent;

    #[test]
    fn test_created_event_shape() {
        let ctx = ExecutionContext::create("admin");
        let role = Role::new("role-admin", "Admin", RoleType::DomainAdmin, "d-1");
        let binding = RoleBinding::new("alice", &role, ResourceGroup::Domain, "*");
        let event = RoleBindingCreated::new(&ctx, &binding, RoleType::User, RoleType::DomainAdmin);

        assert_eq!(event.event_type(), "identity:role_binding:created");
        assert_eq!(event.subject(), format!("identity.role_binding.{}", binding.role_binding_id));

        let data = event.data();
        assert_eq!(data["userRoleTypeBefore"], "USER");
        assert_eq!(data["userRoleType"], "DOMAIN_ADMIN");
        assert_eq!(data["resourceGroup"], "DOMAIN");
    }
}
