//! User Profile
//!
//! Account self-service around the user aggregate: profile edits, email
//! confirmation, password reset, workspace listing and MFA enrollment.

pub mod operations;
pub mod service;

pub use service::{EnableMfaRequest, ProfileCollaborators, UpdateProfileRequest, UserProfileService};
