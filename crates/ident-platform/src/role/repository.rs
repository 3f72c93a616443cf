//! Role Repository

use async_trait::async_trait;
use bson::doc;
use mongodb::{Collection, Database};

use crate::role::entity::Role;
use crate::shared::error::Result;
use crate::usecase::HasId;

/// Read-only role lookup.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find(&self, role_id: &str, domain_id: &str) -> Result<Option<Role>>;
}

pub struct RoleRepository {
    collection: Collection<Role>,
}

impl RoleRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(Role::collection_name()),
        }
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn find(&self, role_id: &str, domain_id: &str) -> Result<Option<Role>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": role_id, "domainId": domain_id })
            .await?)
    }
}
