//! Execution Context
//!
//! Identifies one operation run and the principal behind it. Copied into
//! the metadata of the event the run emits and into its audit entry.

use chrono::{DateTime, Utc};

use crate::shared::tsid::TsidGenerator;

/// Principal recorded for calls made without a caller, e.g. password reset.
pub const ANONYMOUS_PRINCIPAL: &str = "anonymous";

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub execution_id: String,
    /// Defaults to the execution id; set from upstream when the transport
    /// forwards one.
    pub correlation_id: String,
    /// Unset for events raised directly by a request
    pub causation_id: Option<String>,
    pub principal_id: String,
    pub initiated_at: DateTime<Utc>,
}

impl ExecutionContext {
    pub fn create(principal_id: impl Into<String>) -> Self {
        let execution_id = format!("exec-{}", TsidGenerator::generate());
        Self {
            correlation_id: execution_id.clone(),
            execution_id,
            causation_id: None,
            principal_id: principal_id.into(),
            initiated_at: Utc::now(),
        }
    }

    pub fn anonymous() -> Self {
        Self::create(ANONYMOUS_PRINCIPAL)
    }

    /// Join an upstream correlation chain.
    pub fn correlated(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.principal_id == ANONYMOUS_PRINCIPAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_context() {
        let ctx = ExecutionContext::create("alice");

        assert!(ctx.execution_id.starts_with("exec-"));
        assert_eq!(ctx.principal_id, "alice");
        assert_eq!(ctx.correlation_id, ctx.execution_id);
        assert!(ctx.causation_id.is_none());
        assert!(!ctx.is_anonymous());
    }

    #[test]
    fn test_correlated_keeps_execution() {
        let ctx = ExecutionContext::anonymous();
        let execution_id = ctx.execution_id.clone();
        let ctx = ctx.correlated("corr-1");

        assert_eq!(ctx.execution_id, execution_id);
        assert_eq!(ctx.correlation_id, "corr-1");
        assert!(ctx.is_anonymous());
    }
}
