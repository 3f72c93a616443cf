//! Request Handling
//!
//! Descriptors for every exposed operation and the interceptor chain that
//! authenticates, authorizes and scopes each call before it reaches a use case.

pub mod caller;
pub mod chain;
pub mod descriptor;

pub use caller::{permissions, Caller, RequestScope};
pub use chain::{
    AuthenticationInterceptor, AuthorizationInterceptor, EventInterceptor, HandlerChain,
    Interceptor, Invocation, MutationInterceptor,
};
pub use descriptor::{OperationDescriptor, Stage};
