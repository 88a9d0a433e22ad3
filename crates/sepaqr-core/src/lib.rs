//! # sepaqr-core: Pure Payload Pipeline for the SEPA QR Kiosk
//!
//! This crate is the **heart** of the kiosk. It turns a rental cart into an
//! EPC ("BCD") credit-transfer payload and a compact share link, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SEPA QR Kiosk Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI (steppers, fields)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             sepaqr-kiosk (session, config, collaborators)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sepaqr-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   money ─► cart ─► remittance ─► epc ─► share                   │   │
//! │  │     text ──────────────┘           │                            │   │
//! │  │                                    └─► QR renderer (external)   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • PURE FUNCTIONS                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer cents, fixed-point unit prices, currency formatting
//! - [`text`] - UTF-8 byte budgets and ASCII transliteration
//! - [`cart`] - Cart lines, quantities and two-tier rounded totals
//! - [`remittance`] - Unstructured remittance text (≤ 140 bytes)
//! - [`epc`] - The fixed-order EPC payment payload
//! - [`share`] - URL-safe share token and share URL
//! - [`schedule`] - Coalesce-latest debouncer and press-and-hold repeater
//! - [`validation`] - Start-up checks for catalog and settings
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use sepaqr_core::cart::{Cart, CartLine};
//! use sepaqr_core::epc::{build_payload, PaymentRequest};
//! use sepaqr_core::money::UnitPrice;
//! use sepaqr_core::remittance::{build_remittance, RemittanceMode};
//!
//! let mut cart = Cart::new(vec![
//!     CartLine::fixed("REG", "Regulator (incl. hose)", UnitPrice::from_cents(1250)),
//! ]);
//! cart.line_mut("REG").unwrap().set_quantity(2);
//!
//! let totals = cart.recompute();
//! let remittance = build_remittance(&cart, RemittanceMode::Final);
//! let payload = build_payload(&PaymentRequest {
//!     beneficiary_name: "Ieper Dives".to_string(),
//!     iban: "BE68 5390 0754 7034".to_string(),
//!     bic: "gkccbebb".to_string(),
//!     amount: totals.total,
//!     remittance,
//! });
//!
//! assert!(payload.starts_with("BCD\n001\n1\nSCT\nGKCCBEBB\n"));
//! assert!(payload.contains("\nEUR25.00\n"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod epc;
pub mod error;
pub mod money;
pub mod remittance;
pub mod schedule;
pub mod share;
pub mod text;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, LineKind, Totals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, UnitPrice};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single cart line.
///
/// Stepper buttons and typed quantities are clamped to `0..=MAX_LINE_QUANTITY`.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Hard cap on the unstructured remittance field, in UTF-8 bytes.
pub const MAX_REMITTANCE_BYTES: usize = 140;

/// Beneficiary names are cut to this many characters before transliteration.
pub const MAX_BENEFICIARY_CHARS: usize = 70;
