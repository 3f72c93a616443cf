//! Passwords: policy, Argon2id hashing and temporary password generation.

pub mod generator;
pub mod hasher;

use thiserror::Error;

use crate::usecase::UseCaseError;

pub use generator::{PasswordGenerator, RandomPasswordGenerator};
pub use hasher::{Argon2Config, PasswordPolicy, PasswordService};

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password rejected: {}", .0.join("; "))]
    Policy(Vec<String>),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl From<PasswordError> for UseCaseError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Policy(reasons) => UseCaseError::invalid_password(&reasons.join("; ")),
            PasswordError::Hash(message) => UseCaseError::commit(message),
        }
    }
}
