//! # Kiosk Error Types
//!
//! `ApiError` is what the UI adapter receives when a command fails;
//! `ConfigError` covers loading and saving `kiosk.toml`.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Kiosk                              │
//! │                                                                         │
//! │  UI adapter                  Rust                                       │
//! │  ──────────                  ────                                       │
//! │                                                                         │
//! │  invoke('copy_payload')                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function  ─►  Result<T, ApiError>                       │  │
//! │  │                                                                  │  │
//! │  │  Nothing generated yet? ── NOTHING_GENERATED ────────┐          │  │
//! │  │  Unknown SKU?  ─── CoreError::LineNotFound ──────────┤          │  │
//! │  │  Bad viewer URL? ─ ConfigError::InvalidUrl ──────────┼─ ApiError│  │
//! │  │  Bad share link? ─ ShareLinkError ───────────────────┘          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "NOTHING_GENERATED",                                         │
//! │    "message": "Generate the QR code first" }                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use sepaqr_core::error::ShareLinkError;
use sepaqr_core::{CoreError, ValidationError};

// =============================================================================
// API Error
// =============================================================================

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Cart line not found: REG"
/// }
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown cart line
    NotFound,

    /// Tried to edit a catalog line
    NotEditable,

    /// Input validation failed
    ValidationError,

    /// Copy/share/save requested before any payload was generated
    NothingGenerated,

    /// Configuration could not be loaded, saved or used
    ConfigError,

    /// Share token or share URL could not be built or read
    InvalidShareLink,

    /// Internal failure (e.g. background task gone)
    Internal,
}

/// Result type alias for commands.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Copy, share or save before the first generation.
    pub fn nothing_generated() -> Self {
        ApiError::new(ErrorCode::NothingGenerated, "Generate the QR code first")
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LineNotFound(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::LineNotEditable(_) => {
                ApiError::new(ErrorCode::NotEditable, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ShareLinkError> for ApiError {
    fn from(err: ShareLinkError) -> Self {
        ApiError::new(ErrorCode::InvalidShareLink, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "Configuration error");
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Config Error
// =============================================================================

/// Errors while loading, validating or saving `kiosk.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`crate::state::KioskConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No platform config directory and no explicit path.
    #[error("No config path available")]
    NoConfigPath,

    /// The viewer base URL is not an absolute http(s) URL.
    #[error("Invalid viewer base URL: {0}")]
    InvalidUrl(String),

    /// A value failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================
