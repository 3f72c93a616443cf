//! Outbound notifications
//!
//! `Notifier` delivers plain-text emails. `SmtpNotifier` sends them through
//! an SMTP relay; `messages` builds the bodies for each identity flow.

pub mod messages;
pub mod smtp;

use async_trait::async_trait;
use thiserror::Error;

use crate::details;
use crate::usecase::UseCaseError;

pub use smtp::SmtpNotifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Failed to send message: {0}")]
    Transport(String),
}

impl From<NotifyError> for UseCaseError {
    fn from(err: NotifyError) -> Self {
        UseCaseError::CommitError {
            code: "NOTIFICATION_FAILED".to_string(),
            message: err.to_string(),
            details: details!(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError>;
}
