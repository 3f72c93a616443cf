//! Multi-Factor Authentication

pub mod email;
pub mod operations;
pub mod strategy;
pub mod verify_code;

pub use email::EmailMfaStrategy;
pub use strategy::{MfaStrategy, MfaStrategyRegistry};
pub use verify_code::{
    generate_code, CodePurpose, MemoryVerifyCodeStore, MongoVerifyCodeStore, VerifyCodeStore,
};
