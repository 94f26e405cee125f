//! HTTP middleware

pub mod auth;
pub mod logging;

pub use auth::{Admin, Participant};
pub use logging::{logging_middleware, redacted_path};
