//! # Error Types
//!
//! Domain-specific error types for sepaqr-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sepaqr-core errors (this file)                                        │
//! │  ├── CoreError        - Cart / session domain errors                   │
//! │  ├── ValidationError  - Catalog and settings validation                │
//! │  ├── PayloadError     - Reading an EPC record back                     │
//! │  └── ShareLinkError   - Decoding a share token or share URL            │
//! │                                                                         │
//! │  sepaqr-kiosk errors (app crate)                                       │
//! │  ├── ConfigError      - Loading kiosk.toml                             │
//! │  └── ApiError         - What the UI adapter sees (serialized)          │
//! │                                                                         │
//! │  Flow: CoreError / ShareLinkError → ApiError → UI                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, parameter name, etc.)
//! 3. Building a payload never fails: bad numbers become 0, long text is cut.
//!    Only lookups and the decode direction produce errors.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and session errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// No cart line carries this SKU.
    ///
    /// ## When This Occurs
    /// - The UI adapter sends a stepper event for a row that isn't in the catalog
    /// - The catalog changed between page render and event
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// The line exists but its label/price are fixed by the catalog.
    #[error("Cart line {0} is not editable")]
    LineNotEditable(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Catalog and configuration input errors.
///
/// Operator input at the counter is never rejected (it is coerced instead);
/// these errors only guard the catalog and settings the kiosk starts with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Payload Error
// =============================================================================

/// Errors while reading an EPC payload record back into fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// First line is not the `BCD` service tag.
    #[error("Not an EPC payload: service tag is '{0}'")]
    ServiceTag(String),

    /// Record does not carry the fixed number of fields.
    #[error("EPC payload has {actual} fields, expected {expected}")]
    FieldCount { expected: usize, actual: usize },

    /// Amount field is not `EUR<digits>.<2 digits>`.
    #[error("Invalid amount field: '{0}'")]
    Amount(String),
}

// =============================================================================
// Share Link Error
// =============================================================================

/// Errors while decoding a share token or share URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareLinkError {
    /// Token is not valid base64url after padding restoration.
    #[error("Share token is not valid base64: {0}")]
    InvalidBase64(String),

    /// Decoded bytes are not UTF-8.
    #[error("Share token does not decode to UTF-8 text")]
    InvalidUtf8,

    /// A required query parameter is missing.
    #[error("Share URL is missing the '{0}' parameter")]
    MissingParam(&'static str),

    /// The `s` parameter is not a positive integer.
    #[error("Invalid QR size: '{0}'")]
    InvalidSize(String),

    /// The `e` parameter is not one of L, M, Q, H.
    #[error("Invalid error correction level: '{0}'")]
    InvalidErrorCorrection(String),

    /// Base URL or viewer resource could not be resolved.
    #[error("Invalid share URL: {0}")]
    InvalidUrl(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::LineNotFound("REG-01".to_string());
        assert_eq!(err.to_string(), "Cart line not found: REG-01");

        let err = PayloadError::FieldCount {
            expected: 12,
            actual: 3,
        };
        assert_eq!(err.to_string(), "EPC payload has 3 fields, expected 12");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let err: CoreError = ValidationError::Duplicate {
            field: "sku".to_string(),
            value: "REG".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(err.to_string(), "Validation error: sku 'REG' already exists");
    }

    #[test]
    fn test_share_link_error_messages() {
        assert_eq!(
            ShareLinkError::MissingParam("p").to_string(),
            "Share URL is missing the 'p' parameter"
        );
        assert_eq!(
            ShareLinkError::InvalidErrorCorrection("X".into()).to_string(),
            "Invalid error correction level: 'X'"
        );
    }
}
