//! Identity Platform
//!
//! Identity core providing:
//! - Role bindings and the aggregate role type derived from them
//! - MFA enrollment as a two-state machine with pluggable strategies
//! - Profile self-service (email confirmation, password reset)
//! - An interceptor chain that authenticates, authorizes and scopes calls
//! - Use Case pattern with guaranteed event and audit logging
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Store trait and MongoDB implementation
//! - `operations` - Use case operations (where applicable)

// Aggregates
pub mod domain;
pub mod role;
pub mod role_binding;
pub mod user;
pub mod workspace;

// Flows over the user aggregate
pub mod mfa;
pub mod user_profile;

// Collaborators
pub mod notify;
pub mod password;
pub mod token;

// Request handling
pub mod handler;

// Infrastructure
pub mod bootstrap;
pub mod memory;
pub mod shared;
pub mod usecase;

pub use shared::error::{Result, StoreError};
pub use shared::tsid::TsidGenerator;

pub use usecase::{
    DomainEvent, ExecutionContext, MongoUnitOfWork, UnitOfWork, UseCaseError, UseCaseResult,
};
// details! and impl_domain_event! are exported at the crate root via #[macro_export]

pub use bootstrap::{Platform, Stores};
pub use handler::{Caller, HandlerChain, OperationDescriptor};
pub use memory::MemoryBackend;
pub use role::{Role, RoleType};
pub use role_binding::{ResourceGroup, RoleBinding, RoleBindingService, RoleTypeAggregator};
pub use user::{MfaState, MfaType, User, UserInfo};
pub use user_profile::UserProfileService;
pub use workspace::Workspace;
