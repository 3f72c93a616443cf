//! Domain Aggregate

pub mod entity;
pub mod repository;

pub use entity::Domain;
pub use repository::{DomainRepository, DomainStore};
