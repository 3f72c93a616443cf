//! Domain Repository

use async_trait::async_trait;
use bson::doc;
use mongodb::{Collection, Database};

use crate::domain::entity::Domain;
use crate::shared::error::Result;
use crate::usecase::HasId;

#[async_trait]
pub trait DomainStore: Send + Sync {
    async fn find(&self, domain_id: &str) -> Result<Option<Domain>>;
}

pub struct DomainRepository {
    collection: Collection<Domain>,
}

impl DomainRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(Domain::collection_name()),
        }
    }
}

#[async_trait]
impl DomainStore for DomainRepository {
    async fn find(&self, domain_id: &str) -> Result<Option<Domain>> {
        Ok(self.collection.find_one(doc! { "_id": domain_id }).await?)
    }
}
