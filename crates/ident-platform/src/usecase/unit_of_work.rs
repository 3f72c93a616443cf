//! Unit of Work
//!
//! Atomic commit of entity changes, the domain event and the audit log entry
//! within a single MongoDB transaction.

use async_trait::async_trait;
use bson::{doc, to_document, Document};
use mongodb::{Client, ClientSession, Database};
use serde::Serialize;
use tracing::{debug, error};

use super::audit::{AuditLog, StoredEvent, AUDIT_LOGS_COLLECTION, EVENTS_COLLECTION};
use super::domain_event::DomainEvent;
use super::error::UseCaseError;
use super::result::UseCaseResult;
use crate::shared::error::StoreError;

/// Entities persisted through the unit of work.
pub trait HasId {
    fn id(&self) -> &str;
    fn collection_name() -> &'static str;
}

/// One write inside a commit. Changes are applied in order.
#[derive(Debug, Clone)]
pub enum Change {
    /// Insert or fully replace the document with this `_id`.
    Upsert {
        collection: &'static str,
        id: String,
        document: Document,
    },
    Delete {
        collection: &'static str,
        id: String,
    },
}

impl Change {
    pub fn upsert<T: Serialize + HasId>(entity: &T) -> Result<Self, StoreError> {
        Ok(Change::Upsert {
            collection: T::collection_name(),
            id: entity.id().to_string(),
            document: to_document(entity)?,
        })
    }

    pub fn delete<T: HasId>(entity: &T) -> Self {
        Change::Delete {
            collection: T::collection_name(),
            id: entity.id().to_string(),
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            Change::Upsert { collection, .. } | Change::Delete { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Change::Upsert { id, .. } | Change::Delete { id, .. } => id,
        }
    }
}

/// **The only way to produce a successful mutation result.**
///
/// `UseCaseResult::success()` is crate-private, so every use case that
/// changes state returns what `commit_changes` returns. Either all changes,
/// the event and the audit entry are stored, or none of them are.
///
/// ```ignore
/// let changes = vec![Change::upsert(&user)?, Change::upsert(&binding)?];
/// let event = RoleBindingCreated::new(&ctx, &binding, before, user.role_type);
/// self.unit_of_work.commit_changes(changes, event, &command).await
/// ```
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn commit_changes<E, C>(
        &self,
        changes: Vec<Change>,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync;

    /// Commit a single upserted aggregate.
    async fn commit<E, T, C>(&self, aggregate: &T, event: E, command: &C) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Serialize + HasId + Send + Sync,
        C: Serialize + Send + Sync,
    {
        match Change::upsert(aggregate) {
            Ok(change) => self.commit_changes(vec![change], event, command).await,
            Err(e) => UseCaseResult::failure(e.into()),
        }
    }
}

/// MongoDB implementation using multi-document transactions.
///
/// Requires a replica set deployment.
#[derive(Clone)]
pub struct MongoUnitOfWork {
    client: Client,
    database: Database,
}

impl MongoUnitOfWork {
    pub fn new(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    async fn apply<E, C>(
        &self,
        session: &mut ClientSession,
        changes: &[Change],
        event: &E,
        command: &C,
    ) -> Result<(), StoreError>
    where
        E: DomainEvent,
        C: Serialize,
    {
        for change in changes {
            let collection = self.database.collection::<Document>(change.collection());
            match change {
                Change::Upsert { id, document, .. } => {
                    collection
                        .replace_one(doc! { "_id": id.as_str() }, document)
                        .upsert(true)
                        .session(&mut *session)
                        .await?;
                }
                Change::Delete { id, .. } => {
                    collection
                        .delete_one(doc! { "_id": id.as_str() })
                        .session(&mut *session)
                        .await?;
                }
            }
        }

        self.database
            .collection::<StoredEvent>(EVENTS_COLLECTION)
            .insert_one(StoredEvent::from_event(event))
            .session(&mut *session)
            .await?;

        self.database
            .collection::<AuditLog>(AUDIT_LOGS_COLLECTION)
            .insert_one(AuditLog::from_command(event, command))
            .session(&mut *session)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MongoUnitOfWork {
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
        let mut session = match self.client.start_session().await {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to start MongoDB session: {}", e);
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to start session: {}",
                    e
                )));
            }
        };

        if let Err(e) = session.start_transaction().await {
            error!("Failed to start transaction: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(format!(
                "Failed to start transaction: {}",
                e
            )));
        }

        if let Err(e) = self.apply(&mut session, &changes, &event, command).await {
            let _ = session.abort_transaction().await;
            error!(event_type = event.event_type(), "Failed to apply changes: {}", e);
            return UseCaseResult::failure(e.into());
        }

        if let Err(e) = session.commit_transaction().await {
            error!("Failed to commit transaction: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(format!(
                "Failed to commit transaction: {}",
                e
            )));
        }

        debug!(
            event_id = event.event_id(),
            event_type = event.event_type(),
            change_count = changes.len(),
            "Successfully committed transaction"
        );

        UseCaseResult::success(event)
    }
}
