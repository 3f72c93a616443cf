//! User Repository

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use crate::shared::error::Result;
use crate::usecase::HasId;
use crate::user::entity::User;

/// User lookups. Writes go through the unit of work.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, user_id: &str, domain_id: &str) -> Result<Option<User>>;

    /// Users of a domain, optionally restricted to the given ids.
    async fn filter(&self, domain_id: &str, user_ids: Option<&[String]>) -> Result<Vec<User>>;
}

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(User::collection_name()),
        }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find(&self, user_id: &str, domain_id: &str) -> Result<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "userId": user_id, "domainId": domain_id })
            .await?)
    }

    async fn filter(&self, domain_id: &str, user_ids: Option<&[String]>) -> Result<Vec<User>> {
        let mut filter = doc! { "domainId": domain_id };
        if let Some(ids) = user_ids {
            filter.insert("userId", doc! { "$in": ids });
        }
        let cursor = self.collection.find(filter).sort(doc! { "userId": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }
}
