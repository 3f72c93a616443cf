//! MFA strategies and their registry

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::usecase::UseCaseError;
use crate::user::{MfaOptions, MfaType, User};

/// One second-factor mechanism.
#[async_trait]
pub trait MfaStrategy: Send + Sync {
    fn mfa_type(&self) -> MfaType;

    /// Start enrollment with the requested options, e.g. send a first code.
    async fn enroll(&self, user: &User, options: &MfaOptions) -> Result<(), UseCaseError>;

    /// Send the code the user must confirm to switch MFA off.
    async fn send_disable_notice(&self, user: &User) -> Result<(), UseCaseError>;

    async fn verify(&self, user: &User, verify_code: &str) -> Result<bool, UseCaseError>;
}

/// Strategies keyed by MFA type. Adding a mechanism is a `register` call.
#[derive(Default, Clone)]
pub struct MfaStrategyRegistry {
    strategies: HashMap<MfaType, Arc<dyn MfaStrategy>>,
}

impl MfaStrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, strategy: Arc<dyn MfaStrategy>) -> Self {
        self.strategies.insert(strategy.mfa_type(), strategy);
        self
    }

    /// Registered types in a stable order.
    pub fn supported(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self.strategies.keys().map(|t| t.as_str()).collect();
        types.sort_unstable();
        types
    }

    pub fn resolve(&self, mfa_type: MfaType) -> Result<Arc<dyn MfaStrategy>, UseCaseError> {
        self.strategies
            .get(&mfa_type)
            .cloned()
            .ok_or_else(|| UseCaseError::not_supported_mfa_type(mfa_type.as_str(), &self.supported()))
    }

    /// Resolve a type given as text, as it arrives in requests.
    pub fn resolve_str(&self, mfa_type: &str) -> Result<(MfaType, Arc<dyn MfaStrategy>), UseCaseError> {
        let parsed: MfaType = mfa_type
            .parse()
            .map_err(|_| UseCaseError::not_supported_mfa_type(mfa_type, &self.supported()))?;
        Ok((parsed, self.resolve(parsed)?))
    }
}
