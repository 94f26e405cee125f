//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::{config::Config, coordinator::Coordinator};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Judging coordinator shared by every handler
    coordinator: Arc<Coordinator>,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(coordinator: Arc<Coordinator>, config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                coordinator,
                config,
            }),
        }
    }

    /// Get a reference to the coordinator
    pub fn coordinator(&self) -> &Coordinator {
        &self.inner.coordinator
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
