use std::sync::{Arc, OnceLock};

use tracing::{debug, error};

use crate::{AppConfig, ConfigError};

static GLOBAL: AppContext = AppContext::new();

/// Write-once holder for the application configuration.
///
/// Consumers must not fall back to a default when nothing was provided:
/// reading an empty context is a wiring mistake and is reported as
/// [`ConfigError::NotProvided`].
#[derive(Debug)]
pub struct AppContext {
    config: OnceLock<Arc<AppConfig>>,
}

impl AppContext {
    pub const fn new() -> Self {
        Self {
            config: OnceLock::new(),
        }
    }

    /// The process-wide context used by the binary.
    pub fn global() -> &'static AppContext {
        &GLOBAL
    }

    pub fn provide(&self, config: AppConfig) -> Result<Arc<AppConfig>, ConfigError> {
        let shared = Arc::new(config);
        self.config
            .set(shared.clone())
            .map_err(|_| ConfigError::AlreadyProvided("AppConfig"))?;
        debug!("AppConfig provided");
        Ok(shared)
    }

    pub fn current(&self) -> Result<Arc<AppConfig>, ConfigError> {
        self.config.get().cloned().ok_or_else(|| {
            error!("AppConfig requested before it was provided");
            ConfigError::NotProvided("AppConfig")
        })
    }

    pub fn is_provided(&self) -> bool {
        self.config.get().is_some()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}
