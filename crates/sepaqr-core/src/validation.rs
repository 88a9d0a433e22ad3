//! # Validation Module
//!
//! Start-up validation for the catalog and kiosk settings.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Two Kinds of Input                                 │
//! │                                                                         │
//! │  Counter input (quantities, custom price, note, override)              │
//! │  └── NEVER rejected: coerced to 0 / truncated / transliterated         │
//! │                                                                         │
//! │  Catalog + settings (kiosk.toml, environment)                          │
//! │  └── THIS MODULE: rejected early so the kiosk never starts broken      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest QR bitmap edge the kiosk will request, in pixels.
pub const MAX_QR_SIZE: u32 = 4096;

/// Validates a catalog SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens, underscores
///
/// ```rust
/// use sepaqr_core::validation::validate_sku;
///
/// assert!(validate_sku("REG-01").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a catalog label. Labels show on screen and in remittance text.
pub fn validate_label(label: &str) -> ValidationResult<()> {
    let label = label.trim();

    if label.is_empty() {
        return Err(ValidationError::Required {
            field: "label".to_string(),
        });
    }

    if label.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "label".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates that no SKU appears twice.
pub fn validate_unique_skus<'a>(skus: impl IntoIterator<Item = &'a str>) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for sku in skus {
        if !seen.insert(sku) {
            return Err(ValidationError::Duplicate {
                field: "sku".to_string(),
                value: sku.to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a requested QR edge length in pixels.
pub fn validate_qr_size(size: u32) -> ValidationResult<()> {
    if size == 0 || size > MAX_QR_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "qr size".to_string(),
            min: 1,
            max: MAX_QR_SIZE as i64,
        });
    }
    Ok(())
}

/// Validates the beneficiary name. The payload keeps only 70 characters,
/// so longer names are accepted here and cut at encode time.
pub fn validate_beneficiary_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "beneficiary name".to_string(),
        });
    }
    Ok(())
}

/// Validates the rough shape of an IBAN: two letters, two digits, then
/// alphanumerics, spaces allowed. The mod-97 checksum is not verified.
pub fn validate_iban_format(iban: &str) -> ValidationResult<()> {
    let compact: String = iban.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.is_empty() {
        return Err(ValidationError::Required {
            field: "iban".to_string(),
        });
    }

    let bytes = compact.as_bytes();
    let shape_ok = compact.len() >= 5
        && compact.len() <= 34
        && bytes[..2].iter().all(u8::is_ascii_alphabetic)
        && bytes[2..4].iter().all(u8::is_ascii_digit)
        && bytes.iter().all(u8::is_ascii_alphanumeric);

    if !shape_ok {
        return Err(ValidationError::InvalidFormat {
            field: "iban".to_string(),
            reason: "expected country code, check digits and account number".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
