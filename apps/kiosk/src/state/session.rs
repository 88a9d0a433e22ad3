//! # Session State
//!
//! The one counter session: cart, beneficiary and the last generated payload.
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  UI Action              Command                  Session Change         │
//! │  ─────────              ───────                  ──────────────         │
//! │                                                                         │
//! │  Tap/hold +/- ─────────► step_quantity() ──────► line.quantity ± 1     │
//! │  Type quantity ────────► set_quantity() ───────► line.quantity = n     │
//! │  Custom label/price ───► set_custom_*() ───────► custom line edited    │
//! │  Type note ────────────► set_note() ───────────► cart.note             │
//! │  Type remittance ──────► set_override() ───────► cart override         │
//! │  (debounced) ──────────► generate() ───────────► generated payload     │
//! │  Copy / share / save ──► (read only) ──────────► needs a payload       │
//! │                                                                         │
//! │  NOTE: All access goes through the Mutex in SessionState.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use sepaqr_core::cart::{Cart, RemittanceOverride, Totals};
use sepaqr_core::epc::{build_payload, PaymentRequest};
use sepaqr_core::money::{Money, UnitPrice};
use sepaqr_core::remittance::{build_remittance, RemittanceMode};
use sepaqr_core::CoreResult;

use crate::collab::QrImage;
use crate::error::{ApiError, ApiResult};
use crate::state::config::{BeneficiaryConfig, KioskConfig};

/// SKU of the operator-editable line appended after the catalog.
pub const CUSTOM_SKU: &str = "CUSTOM";

/// Beneficiary as currently shown in the payment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    pub name: String,
    pub iban: String,
    pub bic: String,
}

impl From<&BeneficiaryConfig> for Beneficiary {
    fn from(config: &BeneficiaryConfig) -> Self {
        Beneficiary {
            name: config.name.clone(),
            iban: config.iban.clone(),
            bic: config.bic.clone(),
        }
    }
}

/// Result of the last generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPayload {
    /// EPC payload text.
    pub payload: String,
    /// Remittance written into the payload.
    pub remittance: String,
    pub total: Money,
    pub generated_at: DateTime<Utc>,
}

/// One counter session.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    pub beneficiary: Beneficiary,
    cart: Cart,
    generated: Option<GeneratedPayload>,
    qr_image: Option<QrImage>,
}

impl Session {
    /// Opens a session with the configured catalog plus the custom slot.
    pub fn new(config: &KioskConfig) -> CoreResult<Self> {
        let cart = Cart::from_catalog(
            config.catalog.iter().map(|item| item.to_cart_line()),
            CUSTOM_SKU,
        )?;

        let session = Session {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            beneficiary: Beneficiary::from(&config.beneficiary),
            cart,
            generated: None,
            qr_image: None,
        };
        debug!(session_id = %session.id, lines = session.cart.lines().len(), "Session opened");
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn step_quantity(&mut self, sku: &str, delta: i64) -> CoreResult<i64> {
        self.cart.step_quantity(sku, delta)
    }

    /// Sets a quantity from typed text; anything unparsable becomes 0.
    pub fn set_quantity(&mut self, sku: &str, raw: &str) -> CoreResult<i64> {
        self.cart.set_quantity_lossy(sku, raw)
    }

    pub fn set_custom_label(&mut self, label: &str) -> CoreResult<()> {
        self.cart.set_custom_label(CUSTOM_SKU, label)
    }

    pub fn set_custom_price(&mut self, raw: &str) -> CoreResult<UnitPrice> {
        self.cart.set_custom_price(CUSTOM_SKU, raw)
    }

    pub fn set_note(&mut self, note: &str) {
        self.cart.set_note(note);
    }

    /// Sets the manual remittance; empty text removes the override.
    pub fn set_override(&mut self, text: &str, read_only: bool) {
        self.cart.remittance_override = if text.is_empty() {
            None
        } else {
            Some(RemittanceOverride {
                text: text.to_string(),
                read_only,
            })
        };
    }

    /// Zeroes every line and clears note and override.
    pub fn reset(&mut self) {
        self.cart.reset();
        debug!(session_id = %self.id, "Cart reset");
    }

    // =========================================================================
    // Derived Values
    // =========================================================================

    pub fn totals(&self) -> Totals {
        self.cart.recompute()
    }

    /// Generated remittance, shown as the override field's placeholder.
    pub fn remittance_preview(&self) -> String {
        build_remittance(&self.cart, RemittanceMode::Preview)
    }

    /// Characters typed in the note field.
    pub fn note_length(&self) -> usize {
        self.cart.note.as_deref().map_or(0, |n| n.chars().count())
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Recomputes totals and remittance and rebuilds the payload.
    pub fn generate(&mut self) -> GeneratedPayload {
        let totals = self.cart.recompute();
        let remittance = build_remittance(&self.cart, RemittanceMode::Final);

        let payload = build_payload(&PaymentRequest {
            beneficiary_name: self.beneficiary.name.clone(),
            iban: self.beneficiary.iban.clone(),
            bic: self.beneficiary.bic.clone(),
            amount: totals.total,
            remittance: remittance.clone(),
        });

        let generated = GeneratedPayload {
            payload,
            remittance,
            total: totals.total,
            generated_at: Utc::now(),
        };
        debug!(
            session_id = %self.id,
            total = %generated.total.to_fixed2(),
            bytes = generated.payload.len(),
            "Payload generated"
        );

        self.generated = Some(generated.clone());
        generated
    }

    pub fn generated(&self) -> Option<&GeneratedPayload> {
        self.generated.as_ref()
    }

    /// The last payload, or `NOTHING_GENERATED`.
    pub fn require_generated(&self) -> ApiResult<&GeneratedPayload> {
        self.generated.as_ref().ok_or_else(ApiError::nothing_generated)
    }

    pub fn set_qr_image(&mut self, image: Option<QrImage>) {
        self.qr_image = image;
    }

    pub fn qr_image(&self) -> Option<&QrImage> {
        self.qr_image.as_ref()
    }
}

// =============================================================================
// Shared Session State
// =============================================================================

/// Session shared between commands and the regeneration driver.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<Session>>`. Every operation is short and synchronous,
/// so a blocking mutex is held only briefly and never across an `.await`.
#[derive(Debug, Clone)]
pub struct SessionState {
    session: Arc<Mutex<Session>>,
}

impl SessionState {
    pub fn new(session: Session) -> Self {
        SessionState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// Executes a function with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use sepaqr_core::epc::parse_payload;

    fn session() -> Session {
        Session::new(&KioskConfig::default()).unwrap()
    }

    #[test]
    fn test_session_has_catalog_plus_custom_slot() {
        let session = session();
        let skus: Vec<&str> = session.cart().lines().iter().map(|l| l.sku.as_str()).collect();
        assert_eq!(skus, vec!["REG", "BCD", CUSTOM_SKU]);
    }

    #[test]
    fn test_totals_from_spec_example() {
        let mut session = session();
        session.step_quantity("REG", 2).unwrap();
        session.set_quantity("BCD", "3").unwrap();
        assert_eq!(session.totals().total.to_fixed2(), "46.00");
    }

    #[test]
    fn test_generate_builds_payload() {
        let mut session = session();
        session.step_quantity("REG", 1).unwrap();
        session.set_note("graag vóór 18u");

        let generated = session.generate();
        let fields = parse_payload(&generated.payload).unwrap();

        assert_eq!(fields.beneficiary_name, "IEPER DIVES");
        assert_eq!(fields.iban, "BE68539007547034");
        assert_eq!(fields.amount, Money::from_cents(1250));
        assert_eq!(fields.remittance, "REGULATOR X 1 // GRAAG VOOR 18U");
        assert_eq!(session.generated(), Some(&generated));
    }

    #[test]
    fn test_require_generated() {
        let mut session = session();
        let err = session.require_generated().unwrap_err();
        assert_eq!(err.code, ErrorCode::NothingGenerated);

        session.generate();
        assert!(session.require_generated().is_ok());
    }

    #[test]
    fn test_custom_line_and_override() {
        let mut session = session();
        session.set_custom_label("Duiklamp").unwrap();
        session.set_custom_price("4,5").unwrap();
        session.step_quantity(CUSTOM_SKU, 2).unwrap();

        assert_eq!(session.totals().total, Money::from_cents(900));
        assert_eq!(session.remittance_preview(), "DUIKLAMP X 2");

        session.set_override("Factuur 17", false);
        assert_eq!(session.generate().remittance, "FACTUUR 17");

        session.set_override("", false);
        assert!(session.cart().remittance_override.is_none());
    }

    #[test]
    fn test_unknown_sku() {
        let mut session = session();
        assert!(session.step_quantity("NOPE", 1).is_err());
    }

    #[test]
    fn test_reset_and_note_length() {
        let mut session = session();
        session.step_quantity("REG", 3).unwrap();
        session.set_note("vóór");
        assert_eq!(session.note_length(), 4);

        session.reset();
        assert_eq!(session.note_length(), 0);
        assert!(session.totals().total.is_zero());
        assert_eq!(session.remittance_preview(), "GEEN SELECTIE");
    }

    #[test]
    fn test_session_state_shares_one_session() {
        let state = SessionState::new(session());
        let other = state.clone();

        state.with_session_mut(|s| s.step_quantity("REG", 1)).unwrap();
        assert_eq!(other.with_session(|s| s.totals().total), Money::from_cents(1250));
    }
}
