//! MFA Enrollment Operations
//!
//! enable -> confirm switches a second factor on; disable -> confirm switches
//! it off. Every step resolves the strategy registered for the user's type.

pub mod confirm;
pub mod disable;
pub mod enable;
pub mod events;

pub use confirm::{ConfirmMfaCommand, ConfirmMfaUseCase};
pub use disable::{DisableMfaCommand, DisableMfaUseCase};
pub use enable::{EnableMfaCommand, EnableMfaUseCase};
pub use events::{MfaEnrolled, MfaToggled};
