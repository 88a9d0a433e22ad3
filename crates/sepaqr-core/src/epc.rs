//! # EPC Payload Module
//!
//! Encodes a payment request as the newline-separated EPC ("BCD") record that
//! banking apps read from a SEPA credit-transfer QR code.
//!
//! ## Record Layout
//! ```text
//! ┌────┬────────────────────────────┬──────────────────────────────────────┐
//! │ #  │ Field                      │ Example                              │
//! ├────┼────────────────────────────┼──────────────────────────────────────┤
//! │  1 │ Service tag                │ BCD                                  │
//! │  2 │ Version                    │ 001                                  │
//! │  3 │ Character set (1 = UTF-8)  │ 1                                    │
//! │  4 │ Identification             │ SCT                                  │
//! │  5 │ BIC (may be empty)         │ GKCCBEBB                             │
//! │  6 │ Beneficiary name (≤ 70)    │ IEPER DIVES                          │
//! │  7 │ IBAN                       │ BE68539007547034                     │
//! │  8 │ Amount                     │ EUR46.00                             │
//! │  9 │ Purpose code               │ (empty)                              │
//! │ 10 │ Structured reference       │ (empty)                              │
//! │ 11 │ Unstructured remittance    │ REGULATOR X 2 / TRIMVEST X 3         │
//! │ 12 │ Trailing field             │ (empty)                              │
//! └────┴────────────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! The order is an external contract: fields are never reordered or omitted,
//! absent values are empty strings.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::PayloadError;
use crate::money::Money;
use crate::remittance::sanitize_remittance;
use crate::text::transliterate_to_ascii;
use crate::MAX_BENEFICIARY_CHARS;

pub const SERVICE_TAG: &str = "BCD";
pub const VERSION: &str = "001";
pub const CHARACTER_SET: &str = "1";
pub const IDENTIFICATION: &str = "SCT";
pub const CURRENCY: &str = "EUR";

/// Number of newline-separated fields in a record.
pub const FIELD_COUNT: usize = 12;

/// Everything needed to encode one payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub beneficiary_name: String,
    pub iban: String,
    pub bic: String,
    pub amount: Money,
    /// Output of [`crate::remittance::build_remittance`].
    pub remittance: String,
}

/// Builds the EPC payload text.
///
/// ```rust
/// use sepaqr_core::epc::{build_payload, PaymentRequest};
/// use sepaqr_core::money::Money;
///
/// let payload = build_payload(&PaymentRequest {
///     beneficiary_name: "A B".into(),
///     iban: "BE68 5390 0754 7034".into(),
///     bic: "gkccbebb".into(),
///     amount: Money::from_cents(4600),
///     remittance: "X".into(),
/// });
///
/// assert_eq!(
///     payload,
///     "BCD\n001\n1\nSCT\nGKCCBEBB\nA B\nBE68539007547034\nEUR46.00\n\n\nX\n"
/// );
/// ```
pub fn build_payload(request: &PaymentRequest) -> String {
    // The name field is fixed-width: cut first, then transliterate
    let name: String = request
        .beneficiary_name
        .chars()
        .take(MAX_BENEFICIARY_CHARS)
        .collect();

    let amount = request.amount.max(Money::zero());

    let fields: [String; FIELD_COUNT] = [
        SERVICE_TAG.to_string(),
        VERSION.to_string(),
        CHARACTER_SET.to_string(),
        IDENTIFICATION.to_string(),
        request.bic.to_uppercase().trim().to_string(),
        transliterate_to_ascii(&name),
        compact_iban(&request.iban),
        format!("{}{}", CURRENCY, amount.to_fixed2()),
        String::new(),
        String::new(),
        sanitize_remittance(&request.remittance),
        String::new(),
    ];

    fields.join("\n")
}

/// Removes all whitespace and uppercases.
pub fn compact_iban(iban: &str) -> String {
    iban.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

// =============================================================================
// Reading a Record Back
// =============================================================================

/// The variable fields of an EPC record, as read back by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EpcFields {
    pub bic: String,
    pub beneficiary_name: String,
    pub iban: String,
    pub amount: Money,
    pub purpose: String,
    pub structured_reference: String,
    pub remittance: String,
}

/// Parses a payload produced by [`build_payload`].
pub fn parse_payload(payload: &str) -> Result<EpcFields, PayloadError> {
    let fields: Vec<&str> = payload.split('\n').collect();

    if fields[0] != SERVICE_TAG {
        return Err(PayloadError::ServiceTag(fields[0].to_string()));
    }
    if fields.len() != FIELD_COUNT {
        return Err(PayloadError::FieldCount {
            expected: FIELD_COUNT,
            actual: fields.len(),
        });
    }

    Ok(EpcFields {
        bic: fields[4].to_string(),
        beneficiary_name: fields[5].to_string(),
        iban: fields[6].to_string(),
        amount: parse_amount(fields[7])?,
        purpose: fields[8].to_string(),
        structured_reference: fields[9].to_string(),
        remittance: fields[10].to_string(),
    })
}

fn parse_amount(field: &str) -> Result<Money, PayloadError> {
    let invalid = || PayloadError::Amount(field.to_string());

    let digits = field.strip_prefix(CURRENCY).ok_or_else(invalid)?;
    let (whole, frac) = digits.split_once('.').ok_or_else(invalid)?;

    let well_formed = !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.len() == 2
        && frac.bytes().all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let frac: i64 = frac.parse().map_err(|_| invalid())?;
    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac))
        .map(Money::from_cents)
        .ok_or_else(invalid)
}

// =============================================================================
// Unit Tests
// =============================================================================
