//! Role Binding Repository

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use crate::role::RoleType;
use crate::role_binding::entity::{ResourceGroup, RoleBinding, WorkspaceScope};
use crate::shared::error::Result;
use crate::shared::pagination::{Page, PageResult, StatBucket, StatResult};
use crate::usecase::HasId;

/// Filters for list and stat. Unset fields match everything; the keyword
/// matches substrings of the binding, user and role ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleBindingQuery {
    pub role_binding_id: Option<String>,
    pub user_id: Option<String>,
    pub role_id: Option<String>,
    pub role_type: Option<RoleType>,
    pub resource_group: Option<ResourceGroup>,
    pub workspace_id: Option<String>,
    pub keyword: Option<String>,
    #[serde(default)]
    pub page: Page,
}

impl RoleBindingQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, binding: &RoleBinding, scope: &WorkspaceScope) -> bool {
        fn eq<T: PartialEq>(want: &Option<T>, have: &T) -> bool {
            want.as_ref().map_or(true, |w| w == have)
        }

        scope.admits(&binding.workspace_id)
            && eq(&self.role_binding_id, &binding.role_binding_id)
            && eq(&self.user_id, &binding.user_id)
            && eq(&self.role_id, &binding.role_id)
            && eq(&self.role_type, &binding.role_type)
            && eq(&self.resource_group, &binding.resource_group)
            && eq(&self.workspace_id, &binding.workspace_id)
            && self.keyword.as_deref().map_or(true, |k| {
                binding.role_binding_id.contains(k)
                    || binding.user_id.contains(k)
                    || binding.role_id.contains(k)
            })
    }

    /// MongoDB filter equivalent of `matches`, restricted to `domain_id`.
    pub fn to_filter(&self, domain_id: &str, scope: &WorkspaceScope) -> Result<Document> {
        let mut filter = doc! { "domainId": domain_id };

        if let Some(id) = &self.role_binding_id {
            filter.insert("_id", id.as_str());
        }
        if let Some(user_id) = &self.user_id {
            filter.insert("userId", user_id.as_str());
        }
        if let Some(role_id) = &self.role_id {
            filter.insert("roleId", role_id.as_str());
        }
        if let Some(role_type) = &self.role_type {
            filter.insert("roleType", bson::to_bson(role_type)?);
        }
        if let Some(group) = &self.resource_group {
            filter.insert("resourceGroup", bson::to_bson(group)?);
        }

        let mut clauses: Vec<Document> = Vec::new();
        if let Some(workspace_id) = &self.workspace_id {
            clauses.push(doc! { "workspaceId": workspace_id.as_str() });
        }
        if let WorkspaceScope::Only(ids) = scope {
            clauses.push(doc! { "workspaceId": { "$in": ids.as_slice() } });
        }
        if let Some(keyword) = &self.keyword {
            let pattern = regex::escape(keyword);
            clauses.push(doc! {
                "$or": [
                    { "_id": { "$regex": pattern.as_str() } },
                    { "userId": { "$regex": pattern.as_str() } },
                    { "roleId": { "$regex": pattern.as_str() } },
                ]
            });
        }
        if !clauses.is_empty() {
            filter.insert("$and", clauses);
        }

        Ok(filter)
    }
}

/// Field a stat query groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    RoleType,
    ResourceGroup,
    WorkspaceId,
    RoleId,
    UserId,
}

impl StatField {
    pub fn document_field(&self) -> &'static str {
        match self {
            Self::RoleType => "roleType",
            Self::ResourceGroup => "resourceGroup",
            Self::WorkspaceId => "workspaceId",
            Self::RoleId => "roleId",
            Self::UserId => "userId",
        }
    }

    pub fn key_of(&self, binding: &RoleBinding) -> String {
        match self {
            Self::RoleType => binding.role_type.as_str().to_string(),
            Self::ResourceGroup => binding.resource_group.as_str().to_string(),
            Self::WorkspaceId => binding.workspace_id.clone(),
            Self::RoleId => binding.role_id.clone(),
            Self::UserId => binding.user_id.clone(),
        }
    }
}

#[async_trait]
pub trait RoleBindingStore: Send + Sync {
    async fn find(&self, role_binding_id: &str, domain_id: &str) -> Result<Option<RoleBinding>>;

    /// All bindings of a user in a domain, oldest first.
    async fn find_by_user(&self, user_id: &str, domain_id: &str) -> Result<Vec<RoleBinding>>;

    async fn find_duplicate(
        &self,
        user_id: &str,
        role_id: &str,
        workspace_id: &str,
        domain_id: &str,
    ) -> Result<Option<RoleBinding>>;

    /// Matching bindings, oldest first, windowed by `query.page`.
    async fn list(
        &self,
        domain_id: &str,
        scope: &WorkspaceScope,
        query: &RoleBindingQuery,
    ) -> Result<PageResult<RoleBinding>>;

    async fn stat(
        &self,
        domain_id: &str,
        scope: &WorkspaceScope,
        query: &RoleBindingQuery,
        group_by: StatField,
    ) -> Result<StatResult>;
}

pub struct RoleBindingRepository {
    collection: Collection<RoleBinding>,
}

impl RoleBindingRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(RoleBinding::collection_name()),
        }
    }
}

fn bson_count(value: Option<&Bson>) -> u64 {
    match value {
        Some(Bson::Int32(n)) => (*n).max(0) as u64,
        Some(Bson::Int64(n)) => (*n).max(0) as u64,
        _ => 0,
    }
}

#[async_trait]
impl RoleBindingStore for RoleBindingRepository {
    async fn find(&self, role_binding_id: &str, domain_id: &str) -> Result<Option<RoleBinding>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": role_binding_id, "domainId": domain_id })
            .await?)
    }

    async fn find_by_user(&self, user_id: &str, domain_id: &str) -> Result<Vec<RoleBinding>> {
        let cursor = self
            .collection
            .find(doc! { "userId": user_id, "domainId": domain_id })
            .sort(doc! { "createdAt": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_duplicate(
        &self,
        user_id: &str,
        role_id: &str,
        workspace_id: &str,
        domain_id: &str,
    ) -> Result<Option<RoleBinding>> {
        Ok(self
            .collection
            .find_one(doc! {
                "userId": user_id,
                "roleId": role_id,
                "workspaceId": workspace_id,
                "domainId": domain_id,
            })
            .await?)
    }

    async fn list(
        &self,
        domain_id: &str,
        scope: &WorkspaceScope,
        query: &RoleBindingQuery,
    ) -> Result<PageResult<RoleBinding>> {
        let filter = query.to_filter(domain_id, scope)?;
        let total_count = self.collection.count_documents(filter.clone()).await?;

        let mut find = self
            .collection
            .find(filter)
            .sort(doc! { "createdAt": 1 })
            .skip(query.page.start);
        if query.page.limit > 0 {
            find = find.limit(query.page.limit as i64);
        }
        let results = find.await?.try_collect().await?;

        Ok(PageResult { results, total_count })
    }

    async fn stat(
        &self,
        domain_id: &str,
        scope: &WorkspaceScope,
        query: &RoleBindingQuery,
        group_by: StatField,
    ) -> Result<StatResult> {
        let pipeline = vec![
            doc! { "$match": query.to_filter(domain_id, scope)? },
            doc! { "$group": {
                "_id": format!("${}", group_by.document_field()),
                "count": { "$sum": 1 },
            } },
        ];

        let rows: Vec<Document> = self.collection.aggregate(pipeline).await?.try_collect().await?;
        let buckets = rows
            .iter()
            .map(|row| StatBucket {
                key: row.get_str("_id").unwrap_or_default().to_string(),
                count: bson_count(row.get("count")),
            })
            .collect();

        Ok(StatResult::from_buckets(buckets))
    }
}
