//! Identity Common
//!
//! Cross-cutting helpers shared by every process that embeds the identity
//! platform.

pub mod logging;

pub use logging::{init_logging, LogFormat};
