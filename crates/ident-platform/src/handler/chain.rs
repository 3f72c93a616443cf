//! Interceptor Chain
//!
//! Ordered stages wrapped around every exposed operation. Each stage has a
//! single responsibility and may stop the call with a `UseCaseError`:
//!
//! 1. authentication - a caller must be present
//! 2. authorization - role type and permission checks
//! 3. mutation - derives the `RequestScope` from the caller
//! 4. event - logs start and outcome inside the operation span
//!
//! ```ignore
//! chain.run(&ROLE_BINDING_CREATE, Some(caller), |inv| async move {
//!     let scope = inv.scope()?;
//!     use_case.execute(command_for(scope), inv.context).await
//! }).await
//! ```

use std::future::Future;
use std::time::Instant;

use tracing::{debug, info, info_span, warn, Instrument};

use super::caller::{Caller, RequestScope};
use super::descriptor::{OperationDescriptor, Stage};
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

/// State handed from stage to stage and finally to the operation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub caller: Option<Caller>,
    /// Set by the mutation stage
    pub scope: Option<RequestScope>,
    pub context: ExecutionContext,
    started_at: Instant,
}

impl Invocation {
    pub fn new(caller: Option<Caller>) -> Self {
        let context = match &caller {
            Some(c) => {
                let context = ExecutionContext::create(c.user_id.as_str());
                match &c.correlation_id {
                    Some(id) => context.correlated(id.as_str()),
                    None => context,
                }
            }
            None => ExecutionContext::anonymous(),
        };
        Self {
            caller,
            scope: None,
            context,
            started_at: Instant::now(),
        }
    }

    pub fn caller(&self) -> Result<&Caller, UseCaseError> {
        self.caller
            .as_ref()
            .ok_or_else(|| UseCaseError::unauthenticated("Authentication required"))
    }

    pub fn scope(&self) -> Result<&RequestScope, UseCaseError> {
        self.scope
            .as_ref()
            .ok_or_else(|| UseCaseError::unauthenticated("Request scope not resolved"))
    }
}

pub trait Interceptor: Send + Sync {
    fn stage(&self) -> Stage;

    fn before(
        &self,
        descriptor: &OperationDescriptor,
        invocation: &mut Invocation,
    ) -> Result<(), UseCaseError>;

    /// Runs once the operation finished, for stages whose `before` passed.
    fn after(
        &self,
        _descriptor: &OperationDescriptor,
        _invocation: &Invocation,
        _error: Option<&UseCaseError>,
    ) {
    }
}

pub struct AuthenticationInterceptor;

impl Interceptor for AuthenticationInterceptor {
    fn stage(&self) -> Stage {
        Stage::Authentication
    }

    fn before(
        &self,
        _descriptor: &OperationDescriptor,
        invocation: &mut Invocation,
    ) -> Result<(), UseCaseError> {
        invocation.caller().map(|_| ())
    }
}

pub struct AuthorizationInterceptor;

impl Interceptor for AuthorizationInterceptor {
    fn stage(&self) -> Stage {
        Stage::Authorization
    }

    fn before(
        &self,
        descriptor: &OperationDescriptor,
        invocation: &mut Invocation,
    ) -> Result<(), UseCaseError> {
        let caller = invocation.caller()?;

        if caller.role_type.is_system() {
            return Ok(());
        }

        // Self-service operations admit every role type; the grant is still required.
        if !descriptor.is_self_service() && !descriptor.role_types.contains(&caller.role_type) {
            return Err(UseCaseError::not_allowed_role_scope(
                caller.role_type,
                descriptor.role_types,
            ));
        }

        match descriptor.permission {
            Some(permission) if !caller.has_permission(permission) => {
                Err(UseCaseError::permission_denied(permission, &caller.user_id))
            }
            _ => Ok(()),
        }
    }
}

pub struct MutationInterceptor;

impl Interceptor for MutationInterceptor {
    fn stage(&self) -> Stage {
        Stage::Mutation
    }

    fn before(
        &self,
        _descriptor: &OperationDescriptor,
        invocation: &mut Invocation,
    ) -> Result<(), UseCaseError> {
        let scope = RequestScope::for_caller(invocation.caller()?);
        tracing::Span::current().record("domain_id", scope.domain_id.as_str());
        invocation.scope = Some(scope);
        Ok(())
    }
}

pub struct EventInterceptor;

impl Interceptor for EventInterceptor {
    fn stage(&self) -> Stage {
        Stage::Event
    }

    fn before(
        &self,
        descriptor: &OperationDescriptor,
        invocation: &mut Invocation,
    ) -> Result<(), UseCaseError> {
        debug!(
            principal_id = %invocation.context.principal_id,
            mutating = descriptor.mutating,
            "Operation started"
        );
        Ok(())
    }

    fn after(
        &self,
        _descriptor: &OperationDescriptor,
        invocation: &Invocation,
        error: Option<&UseCaseError>,
    ) {
        let elapsed_ms = invocation.started_at.elapsed().as_millis() as u64;
        match error {
            None => info!(elapsed_ms, "Operation succeeded"),
            Some(e) => warn!(
                elapsed_ms,
                code = e.code(),
                status = e.http_status_code(),
                "Operation failed"
            ),
        }
    }
}

pub struct HandlerChain {
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl HandlerChain {
    /// Authentication, authorization, mutation and event stages in that order.
    pub fn new() -> Self {
        Self::with_interceptors(vec![
            Box::new(AuthenticationInterceptor),
            Box::new(AuthorizationInterceptor),
            Box::new(MutationInterceptor),
            Box::new(EventInterceptor),
        ])
    }

    pub fn with_interceptors(interceptors: Vec<Box<dyn Interceptor>>) -> Self {
        Self { interceptors }
    }

    pub async fn run<T, F, Fut>(
        &self,
        descriptor: &OperationDescriptor,
        caller: Option<Caller>,
        operation: F,
    ) -> UseCaseResult<T>
    where
        F: FnOnce(Invocation) -> Fut,
        Fut: Future<Output = UseCaseResult<T>>,
    {
        let mut invocation = Invocation::new(caller);
        let span = info_span!(
            "operation",
            resource = descriptor.resource,
            verb = descriptor.verb,
            domain_id = tracing::field::Empty,
            execution_id = %invocation.context.execution_id,
        );

        async move {
            let active: Vec<&dyn Interceptor> = self
                .interceptors
                .iter()
                .map(|i| i.as_ref())
                .filter(|i| descriptor.runs(i.stage()))
                .collect();

            for (passed, interceptor) in active.iter().enumerate() {
                if let Err(e) = interceptor.before(descriptor, &mut invocation) {
                    debug!(stage = interceptor.stage().as_str(), code = e.code(), "Operation stopped");
                    for done in active[..passed].iter().rev() {
                        done.after(descriptor, &invocation, Some(&e));
                    }
                    return UseCaseResult::failure(e);
                }
            }

            let snapshot = invocation.clone();
            let result = operation(invocation).await;

            for interceptor in active.iter().rev() {
                interceptor.after(descriptor, &snapshot, result.error());
            }
            result
        }
        .instrument(span)
        .await
    }
}

impl Default for HandlerChain {
    fn default() -> Self {
        Self::new()
    }
}
