//! Role Aggregate

pub mod entity;
pub mod repository;

pub use entity::{Role, RoleType};
pub use repository::{RoleRepository, RoleStore};
