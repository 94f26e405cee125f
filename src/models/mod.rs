//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod challenge;
pub mod contest;
pub mod submission;
pub mod user;

pub use challenge::*;
pub use contest::*;
pub use submission::*;
pub use user::*;
