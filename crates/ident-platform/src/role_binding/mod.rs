//! Role Binding Aggregate

pub mod aggregator;
pub mod entity;
pub mod operations;
pub mod repository;
pub mod service;

pub use aggregator::RoleTypeAggregator;
pub use entity::{ResourceGroup, RoleBinding, WorkspaceScope, ALL_WORKSPACES};
pub use repository::{RoleBindingQuery, RoleBindingRepository, RoleBindingStore, StatField};
pub use service::{CreateRoleBindingRequest, RoleBindingService, UpdateRoleRequest};
