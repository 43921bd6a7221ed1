//! Application error types

use thiserror::Error;

use super::config::ConfigError;

/// Fatal error before the first tick
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to create event loop: {0}")]
    EventLoop(String),
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("GPU initialization failed: {0}")]
    Gpu(String),
    #[error("failed to load texture: {0}")]
    Texture(String),
}

impl SetupError {
    /// Process exit code for any setup failure
    pub const EXIT_CODE: u8 = 2;

    pub fn exit_code(&self) -> u8 {
        Self::EXIT_CODE
    }
}
