//! Shared Module
//!
//! Cross-cutting utilities used by every aggregate.

pub mod error;
pub mod pagination;
pub mod tsid;
pub mod user_locks;

pub use error::{Result, StoreError};
pub use pagination::{Page, PageResult, StatBucket, StatResult};
pub use tsid::TsidGenerator;
pub use user_locks::{UserGuard, UserLocks};
