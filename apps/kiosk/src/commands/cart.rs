//! # Cart Commands
//!
//! Commands for the rental sheet. Every command returns the full sheet so
//! the UI can redraw line amounts, total and remittance placeholder at once.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HUUR                                                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Regulator (incl. hose)     12,50     [-]  2  [+]          25,00       │
//! │  Trimvest                    7,00     [-]  3  [+]          21,00       │
//! │  [custom label] [price]               [-]  0  [+]           0,00       │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Opmerking: [graag vóór 18u          ]  (14)                           │
//! │  Mededeling: [REGULATOR X 2 / TRIMVEST X 3 // GRAAG VOOR 18U ]         │
//! │  TOTAAL                                              € 46,00           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use sepaqr_core::cart::{CartLine, LineKind, RemittanceOverride};
use sepaqr_core::money::Money;

use crate::error::ApiResult;
use crate::state::{Session, SessionState};

/// One row of the sheet as the UI draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub sku: String,
    pub kind: LineKind,
    pub label: String,
    /// Unit price with a decimal comma.
    pub unit_price: String,
    pub quantity: i64,
    /// Line amount with a decimal comma, `0,00` for unselected lines.
    pub amount: String,
}

impl From<&CartLine> for LineView {
    fn from(line: &CartLine) -> Self {
        LineView {
            sku: line.sku.clone(),
            kind: line.kind,
            label: line.label().to_string(),
            unit_price: line.unit_price().line_amount(1).round_to_cents().to_line_display(),
            quantity: line.quantity(),
            amount: line.amount().to_line_display(),
        }
    }
}

/// The whole sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<LineView>,
    pub total: Money,
    /// e.g. `€ 46,00`
    pub total_display: String,
    /// Placeholder of the remittance field.
    pub remittance_preview: String,
    pub remittance_override: Option<RemittanceOverride>,
    pub note_length: usize,
}

impl From<&Session> for CartResponse {
    fn from(session: &Session) -> Self {
        let totals = session.totals();
        CartResponse {
            lines: session.cart().lines().iter().map(LineView::from).collect(),
            total: totals.total,
            total_display: totals.total.to_string(),
            remittance_preview: session.remittance_preview(),
            remittance_override: session.cart().remittance_override.clone(),
            note_length: session.note_length(),
        }
    }
}

/// Gets the current sheet.
pub fn get_cart(state: &SessionState) -> CartResponse {
    state.with_session(|s| CartResponse::from(s))
}

/// Adds `delta` to a line's quantity (stepper tap).
pub fn step_quantity(state: &SessionState, sku: &str, delta: i64) -> ApiResult<CartResponse> {
    debug!(sku = %sku, delta, "step_quantity command");
    state.with_session_mut(|s| {
        s.step_quantity(sku, delta)?;
        Ok(CartResponse::from(&*s))
    })
}

/// Sets a quantity from the typed text.
pub fn set_quantity(state: &SessionState, sku: &str, raw: &str) -> ApiResult<CartResponse> {
    debug!(sku = %sku, raw = %raw, "set_quantity command");
    state.with_session_mut(|s| {
        s.set_quantity(sku, raw)?;
        Ok(CartResponse::from(&*s))
    })
}

pub fn set_custom_label(state: &SessionState, label: &str) -> ApiResult<CartResponse> {
    state.with_session_mut(|s| {
        s.set_custom_label(label)?;
        Ok(CartResponse::from(&*s))
    })
}

/// Sets the custom price from the typed text (`4,50` and `4.50` both work).
pub fn set_custom_price(state: &SessionState, raw: &str) -> ApiResult<CartResponse> {
    state.with_session_mut(|s| {
        let price = s.set_custom_price(raw)?;
        debug!(raw = %raw, price = %price, "set_custom_price command");
        Ok(CartResponse::from(&*s))
    })
}

pub fn set_note(state: &SessionState, note: &str) -> CartResponse {
    state.with_session_mut(|s| {
        s.set_note(note);
        CartResponse::from(&*s)
    })
}

/// Sets the manual remittance. `read_only` mirrors a locked input field.
pub fn set_remittance_override(state: &SessionState, text: &str, read_only: bool) -> CartResponse {
    state.with_session_mut(|s| {
        s.set_override(text, read_only);
        CartResponse::from(&*s)
    })
}

pub fn reset_cart(state: &SessionState) -> CartResponse {
    debug!("reset_cart command");
    state.with_session_mut(|s| {
        s.reset();
        CartResponse::from(&*s)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::{KioskConfig, CUSTOM_SKU};

    fn state() -> SessionState {
        SessionState::new(Session::new(&KioskConfig::default()).unwrap())
    }

    #[test]
    fn test_get_cart_initial() {
        let cart = get_cart(&state());
        assert_eq!(cart.lines.len(), 3);
        assert_eq!(cart.lines[0].unit_price, "12,50");
        assert_eq!(cart.lines[0].amount, "0,00");
        assert_eq!(cart.lines[2].label, "CUSTOM");
        assert_eq!(cart.total_display, "€ 0,00");
        assert_eq!(cart.remittance_preview, "GEEN SELECTIE");
    }

    #[test]
    fn test_step_and_set_quantity() {
        let state = state();
        step_quantity(&state, "REG", 2).unwrap();
        let cart = set_quantity(&state, "BCD", "3").unwrap();

        assert_eq!(cart.lines[0].amount, "25,00");
        assert_eq!(cart.lines[1].amount, "21,00");
        assert_eq!(cart.total_display, "€ 46,00");
        assert_eq!(cart.remittance_preview, "REGULATOR X 2 / TRIMVEST X 3");
    }

    #[test]
    fn test_quantity_clamped_and_coerced() {
        let state = state();
        assert_eq!(set_quantity(&state, "REG", "5000").unwrap().lines[0].quantity, 999);
        assert_eq!(set_quantity(&state, "REG", "abc").unwrap().lines[0].quantity, 0);
        assert_eq!(step_quantity(&state, "REG", -1).unwrap().lines[0].quantity, 0);
    }

    #[test]
    fn test_unknown_sku_is_not_found() {
        let err = step_quantity(&state(), "NOPE", 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_custom_line() {
        let state = state();
        set_custom_label(&state, "Lamp (groot)").unwrap();
        set_custom_price(&state, "7,005").unwrap();
        let cart = step_quantity(&state, CUSTOM_SKU, 1).unwrap();

        assert_eq!(cart.lines[2].label, "Lamp (groot)");
        assert_eq!(cart.lines[2].unit_price, "7,01");
        assert_eq!(cart.remittance_preview, "LAMP X 1");
    }

    #[test]
    fn test_note_override_and_reset() {
        let state = state();
        step_quantity(&state, "BCD", 1).unwrap();
        let cart = set_note(&state, "pick-up");
        assert_eq!(cart.note_length, 7);
        assert_eq!(cart.remittance_preview, "TRIMVEST X 1 // PICK-UP");

        let cart = set_remittance_override(&state, "ref 42", false);
        assert_eq!(cart.remittance_override.unwrap().text, "ref 42");
        // The placeholder keeps showing the generated text
        assert_eq!(cart.remittance_preview, "TRIMVEST X 1 // PICK-UP");

        let cart = reset_cart(&state);
        assert!(cart.total.is_zero());
        assert!(cart.remittance_override.is_none());
        assert_eq!(cart.note_length, 0);
    }
}
