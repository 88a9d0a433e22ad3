//! # Remittance Module
//!
//! Builds the unstructured remittance text of the payment.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  selected lines ──► "Regulator x 1 / Trimvest x 2"                     │
//! │        (none)   ──► "GEEN SELECTIE"                                    │
//! │                          │                                              │
//! │  + note          ──► "... // graag vóór 18u"                           │
//! │                          │                                              │
//! │  transliterate   ──► "REGULATOR X 1 / TRIMVEST X 2 // GRAAG VOOR 18U"  │
//! │                          │                                              │
//! │  140-byte cap    ──► auto text  ──────────► Preview (live placeholder) │
//! │                          │                                              │
//! │  editable override? ─ yes ─► transliterate + cap override ──► Final    │
//! │                     └ no ──► auto text ───────────────────────► Final  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::trace;

use crate::cart::Cart;
use crate::text::{transliterate_to_ascii, truncate_to_byte_budget, utf8_byte_length};
use crate::MAX_REMITTANCE_BYTES;

/// Remittance used when no line is selected ("no selection").
pub const NO_SELECTION: &str = "GEEN SELECTIE";

/// Which remittance the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemittanceMode {
    /// Always the generated text, shown as the override field's placeholder.
    Preview,
    /// What goes into the payload: the override if applicable, else generated.
    Final,
}

/// Builds the remittance text for `cart`.
///
/// The result is always ≤ 140 UTF-8 bytes and only contains
/// `[A-Z0-9_ /\-+:.,]`.
///
/// ```rust
/// use sepaqr_core::cart::{Cart, CartLine};
/// use sepaqr_core::money::UnitPrice;
/// use sepaqr_core::remittance::{build_remittance, RemittanceMode};
///
/// let mut cart = Cart::new(vec![
///     CartLine::fixed("REG", "Regulator (incl. hose)", UnitPrice::from_cents(1250)),
/// ]);
/// cart.step_quantity("REG", 1).unwrap();
/// cart.set_note("graag vóór 18u");
///
/// assert_eq!(
///     build_remittance(&cart, RemittanceMode::Final),
///     "REGULATOR X 1 // GRAAG VOOR 18U"
/// );
/// ```
pub fn build_remittance(cart: &Cart, mode: RemittanceMode) -> String {
    let generated = generated_remittance(cart);

    if mode == RemittanceMode::Preview {
        return generated;
    }

    match cart
        .remittance_override
        .as_ref()
        .and_then(|o| o.effective_text())
    {
        Some(text) => {
            trace!(bytes = text.len(), "using remittance override");
            sanitize_remittance(text)
        }
        None => generated,
    }
}

/// Transliterates and caps arbitrary text to a valid remittance.
pub fn sanitize_remittance(text: &str) -> String {
    let ascii = transliterate_to_ascii(text);
    cap(ascii)
}

fn generated_remittance(cart: &Cart) -> String {
    let fragments: Vec<String> = cart
        .selected_lines()
        .map(|line| format!("{} x {}", line.remittance_label(), line.quantity()))
        .collect();

    let mut text = if fragments.is_empty() {
        NO_SELECTION.to_string()
    } else {
        fragments.join(" / ")
    };

    if let Some(note) = cart.effective_note() {
        text.push_str(" // ");
        text.push_str(note);
    }

    sanitize_remittance(&text)
}

fn cap(text: String) -> String {
    if utf8_byte_length(&text) > MAX_REMITTANCE_BYTES {
        trace!(bytes = text.len(), "truncating remittance");
        truncate_to_byte_budget(&text, MAX_REMITTANCE_BYTES).to_string()
    } else {
        text
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartLine, RemittanceOverride};
    use crate::money::UnitPrice;

    fn cart() -> Cart {
        Cart::from_catalog(
            vec![
                CartLine::fixed("REG", "Regulator (incl. hose)", UnitPrice::from_cents(1250)),
                CartLine::fixed("BCD", "Trimvest", UnitPrice::from_cents(700)),
                CartLine::fixed("SUIT", "Pak 7mm – heren", UnitPrice::from_cents(1500)),
            ],
            "CUSTOM",
        )
        .unwrap()
    }

    #[test]
    fn test_no_selection() {
        let cart = cart();
        assert_eq!(build_remittance(&cart, RemittanceMode::Preview), "GEEN SELECTIE");
        assert_eq!(build_remittance(&cart, RemittanceMode::Final), "GEEN SELECTIE");
    }

    #[test]
    fn test_no_selection_with_note() {
        let mut cart = cart();
        cart.set_note("  pick-up 9u ");
        assert_eq!(
            build_remittance(&cart, RemittanceMode::Final),
            "GEEN SELECTIE // PICK-UP 9U"
        );
    }

    #[test]
    fn test_parenthetical_and_diacritics() {
        let mut cart = cart();
        cart.step_quantity("REG", 1).unwrap();
        cart.set_note("graag vóór 18u");
        assert_eq!(
            build_remittance(&cart, RemittanceMode::Final),
            "REGULATOR X 1 // GRAAG VOOR 18U"
        );
    }

    #[test]
    fn test_lines_joined_in_cart_order() {
        let mut cart = cart();
        cart.step_quantity("SUIT", 1).unwrap();
        cart.step_quantity("REG", 2).unwrap();
        cart.set_custom_label("CUSTOM", "Lamp").unwrap();
        cart.step_quantity("CUSTOM", 1).unwrap();
        assert_eq!(
            build_remittance(&cart, RemittanceMode::Final),
            "REGULATOR X 2 / PAK 7MM - HEREN X 1 / LAMP X 1"
        );
    }

    #[test]
    fn test_blank_note_is_ignored() {
        let mut cart = cart();
        cart.step_quantity("BCD", 1).unwrap();
        cart.set_note("   ");
        assert_eq!(build_remittance(&cart, RemittanceMode::Final), "TRIMVEST X 1");
    }

    #[test]
    fn test_override_replaces_generated_text() {
        let mut cart = cart();
        cart.step_quantity("BCD", 2).unwrap();
        cart.remittance_override = Some(RemittanceOverride {
            text: "factuur 2024/017 – Jansen".into(),
            read_only: false,
        });

        assert_eq!(
            build_remittance(&cart, RemittanceMode::Final),
            "FACTUUR 2024/017 - JANSEN"
        );
        // Preview keeps showing the generated text
        assert_eq!(build_remittance(&cart, RemittanceMode::Preview), "TRIMVEST X 2");
    }

    #[test]
    fn test_read_only_or_blank_override_is_ignored() {
        let mut cart = cart();
        cart.step_quantity("BCD", 1).unwrap();

        cart.remittance_override = Some(RemittanceOverride {
            text: "REF".into(),
            read_only: true,
        });
        assert_eq!(build_remittance(&cart, RemittanceMode::Final), "TRIMVEST X 1");

        cart.remittance_override = Some(RemittanceOverride {
            text: "   ".into(),
            read_only: false,
        });
        assert_eq!(build_remittance(&cart, RemittanceMode::Final), "TRIMVEST X 1");
    }

    #[test]
    fn test_long_remittance_is_capped() {
        let mut cart = cart();
        cart.step_quantity("REG", 1).unwrap();
        cart.set_note(&"a".repeat(160));

        let text = build_remittance(&cart, RemittanceMode::Final);
        assert_eq!(text.len(), 140);
        assert!(text.starts_with("REGULATOR X 1 // AAAA"));
    }

    #[test]
    fn test_long_override_is_capped() {
        let mut cart = cart();
        cart.remittance_override = Some(RemittanceOverride {
            text: "é".repeat(200),
            read_only: false,
        });
        let text = build_remittance(&cart, RemittanceMode::Final);
        assert_eq!(text, "E".repeat(140));
    }

    #[test]
    fn test_sanitize_remittance() {
        assert_eq!(sanitize_remittance("  a  b "), "A B");
        assert_eq!(sanitize_remittance(&"x".repeat(160)).len(), 140);
    }
}
