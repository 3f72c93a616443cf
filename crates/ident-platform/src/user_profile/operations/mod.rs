//! User Profile Operations
//!
//! Self-service account flows. Each mutation holds the user's lock and
//! commits through the unit of work.

pub mod confirm_email;
pub mod events;
pub mod query;
pub mod reset_password;
pub mod update;
pub mod verify_email;

pub use confirm_email::{ConfirmEmailCommand, ConfirmEmailUseCase};
pub use events::{EmailVerified, PasswordReset, ProfileUpdated};
pub use query::UserProfileQueries;
pub use reset_password::{
    ResetCredentials, ResetPasswordCommand, ResetPasswordSettings, ResetPasswordUseCase,
};
pub use update::{UpdateProfileCommand, UpdateProfileUseCase};
pub use verify_email::{VerifyEmailCommand, VerifyEmailUseCase};
