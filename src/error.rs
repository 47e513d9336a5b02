//! # Error Types
//!
//! Custom error types for Dualpad Host using `thiserror`.

use thiserror::Error;

/// Main error type for Dualpad Host
#[derive(Debug, Error)]
pub enum DualpadError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State log serialization errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// HID enumeration or device I/O errors
    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// No supported controller could be opened
    #[error("No supported controller found (tried: {0})")]
    DeviceNotFound(String),
}

/// Result type alias for Dualpad Host
pub type Result<T> = std::result::Result<T, DualpadError>;
