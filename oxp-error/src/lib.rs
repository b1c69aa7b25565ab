//! Unified error handling for oxpec
//!
//! A single error type shared by the core library and the command-line
//! front end, derived with thiserror.

use std::io;
use std::path::PathBuf;

/// Result type alias using OxpError
pub type Result<T> = std::result::Result<T, OxpError>;

/// Unified error type for all oxpec operations
#[derive(thiserror::Error, Debug)]
pub enum OxpError {
    // ============================================================================
    // EC Access Errors
    // ============================================================================
    /// The platform lock could not be taken in time. Transient.
    #[error("EC busy: platform lock not acquired within {timeout_ms} ms")]
    Busy { timeout_ms: u64 },

    /// A single EC byte transaction failed.
    #[error("EC transaction on register 0x{register:02X} failed: {reason}")]
    EcTransaction { register: u8, reason: String },

    #[error("Failed to release platform lock: {0}")]
    MutexRelease(String),

    #[error("EC interface not available at {0}")]
    EcUnavailable(PathBuf),

    // ============================================================================
    // Contract Errors
    // ============================================================================
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No supported board matches vendor {vendor:?}, model {model:?}")]
    NoMatch { vendor: String, model: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl OxpError {
    /// Create an EC transaction error
    pub fn ec(register: u8, reason: impl Into<String>) -> Self {
        Self::EcTransaction {
            register,
            reason: reason.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn no_match(vendor: impl Into<String>, model: impl Into<String>) -> Self {
        Self::NoMatch {
            vendor: vendor.into(),
            model: model.into(),
        }
    }

    /// True for failures a caller may retry at its own discretion.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Busy { .. } | Self::EcTransaction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_is_transient() {
        assert!(OxpError::Busy { timeout_ms: 500 }.is_transient());
        assert!(OxpError::ec(0x4B, "short read").is_transient());
    }

    #[test]
    fn test_contract_errors_are_permanent() {
        assert!(!OxpError::unsupported("fan input").is_transient());
        assert!(!OxpError::invalid("pwm 300").is_transient());
        assert!(!OxpError::no_match("Acme", "Box").is_transient());
    }

    #[test]
    fn test_display_includes_register() {
        let msg = OxpError::ec(0x76, "short read").to_string();
        assert!(msg.contains("0x76"));
        assert!(msg.contains("short read"));
    }

    #[test]
    fn test_busy_display_mentions_timeout() {
        let msg = OxpError::Busy { timeout_ms: 500 }.to_string();
        assert!(msg.contains("500 ms"));
    }
}
