//! In-memory backend
//!
//! Implements every store and the unit of work over BSON documents held in
//! process memory. Used by tests and local runs without MongoDB.

use async_trait::async_trait;
use bson::Document;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::bootstrap::Stores;
use crate::domain::{Domain, DomainStore};
use crate::mfa::VerifyCodeStore;
use crate::role::{Role, RoleStore};
use crate::role_binding::{RoleBinding, RoleBindingQuery, RoleBindingStore, StatField, WorkspaceScope};
use crate::shared::error::{Result, StoreError};
use crate::shared::pagination::{PageResult, StatBucket, StatResult};
use crate::usecase::{
    AuditLog, Change, DomainEvent, HasId, StoredEvent, UnitOfWork, UseCaseError, UseCaseResult,
};
use crate::user::{User, UserStore};
use crate::workspace::{Workspace, WorkspaceFilter, WorkspaceStore};

type Collections = HashMap<&'static str, BTreeMap<String, Document>>;

#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<Collections>,
    events: RwLock<Vec<StoredEvent>>,
    audit_logs: RwLock<Vec<AuditLog>>,
    fail_commits: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store views over this backend.
    pub fn stores(self: &Arc<Self>, verify_codes: Arc<dyn VerifyCodeStore>) -> Stores {
        Stores {
            users: self.clone(),
            roles: self.clone(),
            workspaces: self.clone(),
            domains: self.clone(),
            role_bindings: self.clone(),
            verify_codes,
        }
    }

    /// Seed an entity directly, bypassing events and audit.
    pub fn insert<T: Serialize + HasId>(&self, entity: &T) -> Result<()> {
        let document = bson::to_document(entity)?;
        self.collections
            .write()
            .entry(T::collection_name())
            .or_default()
            .insert(entity.id().to_string(), document);
        Ok(())
    }

    pub fn get<T: DeserializeOwned + HasId>(&self, id: &str) -> Result<Option<T>> {
        let collections = self.collections.read();
        collections
            .get(T::collection_name())
            .and_then(|c| c.get(id))
            .map(|doc| bson::from_document(doc.clone()).map_err(StoreError::from))
            .transpose()
    }

    /// Every entity of a collection, in `_id` order.
    pub fn all<T: DeserializeOwned + HasId>(&self) -> Result<Vec<T>> {
        let collections = self.collections.read();
        let Some(collection) = collections.get(T::collection_name()) else {
            return Ok(Vec::new());
        };
        collection
            .values()
            .map(|doc| bson::from_document(doc.clone()).map_err(StoreError::from))
            .collect()
    }

    pub fn events(&self) -> Vec<StoredEvent> {
        self.events.read().clone()
    }

    pub fn audit_logs(&self) -> Vec<AuditLog> {
        self.audit_logs.read().clone()
    }

    /// Make every following commit fail.
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    fn select<T, F>(&self, keep: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned + HasId,
        F: Fn(&T) -> bool,
    {
        Ok(self.all::<T>()?.into_iter().filter(|e| keep(e)).collect())
    }

    fn bindings_in_scope(
        &self,
        domain_id: &str,
        scope: &WorkspaceScope,
        query: &RoleBindingQuery,
    ) -> Result<Vec<RoleBinding>> {
        let mut bindings =
            self.select(|b: &RoleBinding| b.domain_id == domain_id && query.matches(b, scope))?;
        bindings.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.role_binding_id.cmp(&b.role_binding_id))
        });
        Ok(bindings)
    }
}

#[async_trait]
impl UserStore for MemoryBackend {
    async fn find(&self, user_id: &str, domain_id: &str) -> Result<Option<User>> {
        Ok(self
            .select(|u: &User| u.user_id == user_id && u.domain_id == domain_id)?
            .into_iter()
            .next())
    }

    async fn filter(&self, domain_id: &str, user_ids: Option<&[String]>) -> Result<Vec<User>> {
        let mut users = self.select(|u: &User| {
            u.domain_id == domain_id && user_ids.map_or(true, |ids| ids.contains(&u.user_id))
        })?;
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(users)
    }
}

#[async_trait]
impl RoleStore for MemoryBackend {
    async fn find(&self, role_id: &str, domain_id: &str) -> Result<Option<Role>> {
        Ok(self.get::<Role>(role_id)?.filter(|r| r.domain_id == domain_id))
    }
}

#[async_trait]
impl WorkspaceStore for MemoryBackend {
    async fn find(&self, workspace_id: &str, domain_id: &str) -> Result<Option<Workspace>> {
        Ok(self
            .get::<Workspace>(workspace_id)?
            .filter(|w| w.domain_id == domain_id))
    }

    async fn filter(&self, domain_id: &str, filter: &WorkspaceFilter) -> Result<Vec<Workspace>> {
        self.select(|w: &Workspace| w.domain_id == domain_id && filter.matches(w))
    }
}

#[async_trait]
impl DomainStore for MemoryBackend {
    async fn find(&self, domain_id: &str) -> Result<Option<Domain>> {
        self.get::<Domain>(domain_id)
    }
}

#[async_trait]
impl RoleBindingStore for MemoryBackend {
    async fn find(&self, role_binding_id: &str, domain_id: &str) -> Result<Option<RoleBinding>> {
        Ok(self
            .get::<RoleBinding>(role_binding_id)?
            .filter(|b| b.domain_id == domain_id))
    }

    async fn find_by_user(&self, user_id: &str, domain_id: &str) -> Result<Vec<RoleBinding>> {
        self.bindings_in_scope(domain_id, &WorkspaceScope::All, &RoleBindingQuery::for_user(user_id))
    }

    async fn find_duplicate(
        &self,
        user_id: &str,
        role_id: &str,
        workspace_id: &str,
        domain_id: &str,
    ) -> Result<Option<RoleBinding>> {
        Ok(self
            .select(|b: &RoleBinding| {
                b.user_id == user_id
                    && b.role_id == role_id
                    && b.workspace_id == workspace_id
                    && b.domain_id == domain_id
            })?
            .into_iter()
            .next())
    }

    async fn list(
        &self,
        domain_id: &str,
        scope: &WorkspaceScope,
        query: &RoleBindingQuery,
    ) -> Result<PageResult<RoleBinding>> {
        let matched = self.bindings_in_scope(domain_id, scope, query)?;
        let total_count = matched.len() as u64;
        Ok(PageResult {
            results: query.page.slice(matched),
            total_count,
        })
    }

    async fn stat(
        &self,
        domain_id: &str,
        scope: &WorkspaceScope,
        query: &RoleBindingQuery,
        group_by: StatField,
    ) -> Result<StatResult> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for binding in self.bindings_in_scope(domain_id, scope, query)? {
            *counts.entry(group_by.key_of(&binding)).or_default() += 1;
        }
        let buckets = counts
            .into_iter()
            .map(|(key, count)| StatBucket { key, count })
            .collect();
        Ok(StatResult::from_buckets(buckets))
    }
}

#[async_trait]
impl UnitOfWork for MemoryBackend {
    async fn commit_changes<E, C>(
        &self,
        changes: Vec<Change>,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync,
    {
        if self.fail_commits.load(Ordering::SeqCst) {
            return UseCaseResult::failure(UseCaseError::commit("in-memory commit disabled"));
        }

        let stored = StoredEvent::from_event(&event);
        let audit = AuditLog::from_command(&event, command);
        {
            let mut collections = self.collections.write();
            for change in &changes {
                let collection = collections.entry(change.collection()).or_default();
                match change {
                    Change::Upsert { id, document, .. } => {
                        collection.insert(id.clone(), document.clone());
                    }
                    Change::Delete { id, .. } => {
                        collection.remove(id);
                    }
                }
            }
            self.events.write().push(stored);
            self.audit_logs.write().push(audit);
        }

        debug!(
            event_id = event.event_id(),
            event_type = event.event_type(),
            change_count = changes.len(),
            "Committed in memory"
        );
        UseCaseResult::success(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::RoleType;
    use crate::role_binding::ResourceGroup;
    use crate::shared::pagination::Page;

    fn backend_with_bindings() -> Arc<MemoryBackend> {
        let backend = MemoryBackend::new();
        let member = Role::new("role-member", "member", RoleType::WorkspaceMember, "d-1");
        let owner = Role::new("role-owner", "owner", RoleType::WorkspaceOwner, "d-1");
        for (user, role, ws) in [
            ("alice", &member, "ws-1"),
            ("alice", &owner, "ws-2"),
            ("bob", &member, "ws-1"),
        ] {
            let binding = RoleBinding::new(user, role, ResourceGroup::Workspace, ws);
            backend.insert(&binding).unwrap();
        }
        backend
    }

    #[tokio::test]
    async fn test_user_lookup_is_domain_scoped() {
        let backend = MemoryBackend::new();
        backend.insert(&User::new("alice", "d-1")).unwrap();

        assert!(UserStore::find(&*backend, "alice", "d-1").await.unwrap().is_some());
        assert!(UserStore::find(&*backend, "alice", "d-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_respects_scope_and_page() {
        let backend = backend_with_bindings();
        let scope = WorkspaceScope::Only(vec!["ws-1".to_string()]);
        let query = RoleBindingQuery {
            page: Page::new(0, 1),
            ..RoleBindingQuery::default()
        };

        let page = backend.list("d-1", &scope, &query).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].workspace_id, "ws-1");
    }

    #[tokio::test]
    async fn test_stat_groups_by_field() {
        let backend = backend_with_bindings();
        let stat = backend
            .stat("d-1", &WorkspaceScope::All, &RoleBindingQuery::default(), StatField::UserId)
            .await
            .unwrap();

        assert_eq!(stat.total_count, 3);
        assert_eq!(stat.results[0], StatBucket { key: "alice".into(), count: 2 });
    }

    #[tokio::test]
    async fn test_failed_commit_writes_nothing() {
        use crate::role_binding::operations::events::RoleBindingDeleted;
        use crate::usecase::ExecutionContext;

        let backend = backend_with_bindings();
        let binding = backend.all::<RoleBinding>().unwrap().remove(0);
        let user = User::new(binding.user_id.clone(), "d-1");
        backend.set_fail_commits(true);

        let event = RoleBindingDeleted::new(&ExecutionContext::create("tester"), &binding, user.role_type);
        let result = backend
            .commit_changes(vec![Change::delete(&binding)], event, &"delete")
            .await;

        assert!(result.is_failure());
        assert_eq!(backend.all::<RoleBinding>().unwrap().len(), 3);
        assert!(backend.events().is_empty());
        assert!(backend.audit_logs().is_empty());
    }
}
