//! Role Binding Operations
//!
//! create / change_role / delete keep the user's aggregate role type in step
//! with the bindings; each commits the user and the binding together.

pub mod change_role;
pub mod create;
pub mod delete;
pub mod events;
pub mod query;

pub use change_role::{ChangeRoleCommand, ChangeRoleUseCase};
pub use create::{CreateRoleBindingCommand, CreateRoleBindingUseCase};
pub use delete::{DeleteRoleBindingCommand, DeleteRoleBindingUseCase};
pub use events::{RoleBindingCreated, RoleBindingDeleted, RoleBindingRoleChanged};
pub use query::RoleBindingQueries;
