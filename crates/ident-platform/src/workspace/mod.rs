//! Workspace Aggregate

pub mod entity;
pub mod repository;

pub use entity::{Workspace, WorkspaceState};
pub use repository::{WorkspaceFilter, WorkspaceRepository, WorkspaceStore};
