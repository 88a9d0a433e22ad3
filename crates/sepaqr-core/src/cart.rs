//! # Cart Module
//!
//! Rental lines, quantities and totals.
//!
//! ## Cart Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (created once per session, lines never removed, only zeroed)     │
//! │                                                                         │
//! │  ┌────────┬──────────────────────────┬─────────┬─────┬───────────┐      │
//! │  │ sku    │ label                    │ price   │ qty │ kind      │      │
//! │  ├────────┼──────────────────────────┼─────────┼─────┼───────────┤      │
//! │  │ REG    │ Regulator (incl. hose)   │ 12,50   │  2  │ Fixed     │      │
//! │  │ BCD    │ Trimvest                 │  7,00   │  3  │ Fixed     │      │
//! │  │ CUSTOM │ <operator typed>         │ <typed> │  0  │ Custom    │      │
//! │  └────────┴──────────────────────────┴─────────┴─────┴───────────┘      │
//! │                                                                         │
//! │  + note ("graag vóór 18u")                                             │
//! │  + remittance override (operator-typed reference, may be read-only)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! Each line is rounded to cents for display, but the grand total is the sum
//! of the *unrounded* line products rounded once at the end.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{clamp, clamp_lossy, ExactAmount, Money, UnitPrice};
use crate::validation::validate_unique_skus;
use crate::MAX_LINE_QUANTITY;

/// Label used by a custom line the operator left empty.
pub const DEFAULT_CUSTOM_LABEL: &str = "CUSTOM";

// =============================================================================
// Cart Line
// =============================================================================

/// Whether a line's label and price come from the catalog or the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Label and price fixed by the catalog.
    Fixed,
    /// Label and price typed by the operator.
    Custom,
}

/// One row of the rental sheet.
///
/// Deserializing goes through the same coercions as the setters: quantities
/// are clamped to `0..=999` and the price is parsed leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", from = "CartLineRecord")]
pub struct CartLine {
    /// Row identifier.
    pub sku: String,

    /// Fixed or operator-editable.
    pub kind: LineKind,

    /// Display label as entered; see [`CartLine::label`] for the effective one.
    label: String,

    /// Price per unit, as a decimal string on the wire.
    #[ts(type = "string")]
    unit_price: UnitPrice,

    /// Always within `0..=MAX_LINE_QUANTITY`.
    quantity: i64,
}

impl CartLine {
    /// Creates a catalog line with quantity 0.
    pub fn fixed(sku: impl Into<String>, label: impl Into<String>, unit_price: UnitPrice) -> Self {
        CartLine {
            sku: sku.into(),
            kind: LineKind::Fixed,
            label: label.into().trim().to_string(),
            unit_price,
            quantity: 0,
        }
    }

    /// Creates the operator-editable slot: empty label, zero price.
    pub fn custom(sku: impl Into<String>) -> Self {
        CartLine {
            sku: sku.into(),
            kind: LineKind::Custom,
            label: String::new(),
            unit_price: UnitPrice::ZERO,
            quantity: 0,
        }
    }

    /// Effective label: trimmed, `CUSTOM` when a custom line has none.
    pub fn label(&self) -> &str {
        if self.kind == LineKind::Custom && self.label.trim().is_empty() {
            DEFAULT_CUSTOM_LABEL
        } else {
            self.label.trim()
        }
    }

    /// Label as used in remittance text: everything from the first `(` is
    /// dropped, so `Regulator (incl. hose)` becomes `Regulator`.
    pub fn remittance_label(&self) -> &str {
        let label = self.label();
        match label.find('(') {
            Some(idx) => label[..idx].trim(),
            None => label,
        }
    }

    #[inline]
    pub fn unit_price(&self) -> UnitPrice {
        self.unit_price
    }

    #[inline]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.quantity > 0
    }

    #[inline]
    pub fn is_editable(&self) -> bool {
        self.kind == LineKind::Custom
    }

    /// Sets the quantity, clamped to `0..=999`.
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = clamp(quantity, 0, MAX_LINE_QUANTITY);
    }

    /// Sets the quantity from raw text; unparsable input becomes 0.
    pub fn set_quantity_lossy(&mut self, raw: &str) {
        self.quantity = clamp_lossy(raw, 0, MAX_LINE_QUANTITY);
    }

    /// Adds `delta` (stepper button) and returns the new quantity.
    pub fn step(&mut self, delta: i64) -> i64 {
        self.set_quantity(self.quantity.saturating_add(delta));
        self.quantity
    }

    /// The unrounded line product.
    pub fn exact_amount(&self) -> ExactAmount {
        self.unit_price.line_amount(self.quantity)
    }

    /// Line amount rounded to cents, for display.
    pub fn amount(&self) -> Money {
        self.exact_amount().round_to_cents()
    }

    fn ensure_editable(&self) -> CoreResult<()> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(CoreError::LineNotEditable(self.sku.clone()))
        }
    }
}

/// Unchecked wire form of a [`CartLine`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartLineRecord {
    sku: String,
    kind: LineKind,
    #[serde(default)]
    label: String,
    #[serde(default)]
    unit_price: String,
    #[serde(default)]
    quantity: i64,
}

impl From<CartLineRecord> for CartLine {
    fn from(record: CartLineRecord) -> Self {
        let mut line = CartLine {
            sku: record.sku,
            kind: record.kind,
            label: record.label,
            unit_price: UnitPrice::parse_lossy(&record.unit_price),
            quantity: 0,
        };
        line.set_quantity(record.quantity);
        line
    }
}

// =============================================================================
// Remittance Override
// =============================================================================

/// Operator-typed remittance text replacing the generated one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RemittanceOverride {
    /// Raw text as typed.
    pub text: String,

    /// A read-only override field is shown but never applied.
    #[serde(default)]
    pub read_only: bool,
}

impl RemittanceOverride {
    /// Returns the trimmed text when this override should replace the
    /// generated remittance.
    pub fn effective_text(&self) -> Option<&str> {
        let text = self.text.trim();
        if self.read_only || text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Display amount for one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineAmount {
    pub sku: String,
    pub quantity: i64,
    /// Rounded to cents; zero for unselected lines.
    pub amount: Money,
}

/// Result of [`Cart::recompute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// One entry per cart line, in cart order.
    pub per_line: Vec<LineAmount>,

    /// Sum of unrounded line products, rounded once.
    pub total: Money,
}

// =============================================================================
// Cart
// =============================================================================

/// The rental sheet for one session.
///
/// ## Invariants
/// - Line order is fixed at creation and drives remittance ordering
/// - Lines are never removed; [`Cart::reset`] zeroes them
/// - Quantities stay within `0..=999`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,

    /// Free-text note appended to the remittance.
    pub note: Option<String>,

    /// Operator-typed remittance replacing the generated one.
    pub remittance_override: Option<RemittanceOverride>,
}

impl Cart {
    /// Creates a cart from prepared lines. Duplicate SKUs are not checked,
    /// use [`Cart::from_catalog`] for untrusted input.
    pub fn new(lines: Vec<CartLine>) -> Self {
        Cart {
            lines,
            note: None,
            remittance_override: None,
        }
    }

    /// Creates a cart from catalog lines plus one custom slot at the end.
    pub fn from_catalog(
        catalog: impl IntoIterator<Item = CartLine>,
        custom_sku: &str,
    ) -> CoreResult<Self> {
        let mut lines: Vec<CartLine> = catalog.into_iter().collect();
        lines.push(CartLine::custom(custom_sku));
        validate_unique_skus(lines.iter().map(|l| l.sku.as_str()))?;
        Ok(Cart::new(lines))
    }

    /// Lines in display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, sku: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.sku == sku)
    }

    pub fn line_mut(&mut self, sku: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.sku == sku)
    }

    fn require_line_mut(&mut self, sku: &str) -> CoreResult<&mut CartLine> {
        self.line_mut(sku)
            .ok_or_else(|| CoreError::LineNotFound(sku.to_string()))
    }

    /// Stepper: adds `delta` to a line's quantity and returns the new value.
    pub fn step_quantity(&mut self, sku: &str, delta: i64) -> CoreResult<i64> {
        Ok(self.require_line_mut(sku)?.step(delta))
    }

    /// Sets a quantity from raw text (typed into the quantity field).
    pub fn set_quantity_lossy(&mut self, sku: &str, raw: &str) -> CoreResult<i64> {
        let line = self.require_line_mut(sku)?;
        line.set_quantity_lossy(raw);
        Ok(line.quantity())
    }

    /// Sets the label of a custom line.
    pub fn set_custom_label(&mut self, sku: &str, label: &str) -> CoreResult<()> {
        let line = self.require_line_mut(sku)?;
        line.ensure_editable()?;
        line.label = label.to_string();
        Ok(())
    }

    /// Sets the price of a custom line from raw text; unparsable → 0.
    pub fn set_custom_price(&mut self, sku: &str, raw: &str) -> CoreResult<UnitPrice> {
        let line = self.require_line_mut(sku)?;
        line.ensure_editable()?;
        line.unit_price = UnitPrice::parse_lossy(raw);
        Ok(line.unit_price)
    }

    /// Sets or clears the note (empty text clears it).
    pub fn set_note(&mut self, note: &str) {
        self.note = if note.is_empty() {
            None
        } else {
            Some(note.to_string())
        };
    }

    /// The note, trimmed, if it carries any text.
    pub fn effective_note(&self) -> Option<&str> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    /// Zeroes every line and clears note and override.
    pub fn reset(&mut self) {
        for line in &mut self.lines {
            line.quantity = 0;
        }
        self.note = None;
        self.remittance_override = None;
    }

    /// Lines with quantity > 0, in cart order.
    pub fn selected_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|l| l.is_selected())
    }

    /// Per-line display amounts and the grand total.
    ///
    /// ```rust
    /// use sepaqr_core::cart::{Cart, CartLine};
    /// use sepaqr_core::money::UnitPrice;
    ///
    /// let mut cart = Cart::new(vec![
    ///     CartLine::fixed("A", "Fles 12L", UnitPrice::from_cents(1250)),
    ///     CartLine::fixed("B", "Lood", UnitPrice::from_cents(700)),
    /// ]);
    /// cart.step_quantity("A", 2).unwrap();
    /// cart.step_quantity("B", 3).unwrap();
    ///
    /// assert_eq!(cart.recompute().total.to_fixed2(), "46.00");
    /// ```
    pub fn recompute(&self) -> Totals {
        let per_line = self
            .lines
            .iter()
            .map(|line| LineAmount {
                sku: line.sku.clone(),
                quantity: line.quantity,
                amount: line.amount(),
            })
            .collect();

        let total: ExactAmount = self.lines.iter().map(CartLine::exact_amount).sum();

        Totals {
            per_line,
            total: total.round_to_cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rental_cart() -> Cart {
        Cart::from_catalog(
            vec![
                CartLine::fixed("REG", "Regulator (incl. hose)", UnitPrice::from_cents(1250)),
                CartLine::fixed("BCD", "Trimvest", UnitPrice::from_cents(700)),
            ],
            "CUSTOM",
        )
        .unwrap()
    }

    #[test]
    fn test_totals_example() {
        let mut cart = rental_cart();
        cart.step_quantity("REG", 2).unwrap();
        cart.step_quantity("BCD", 3).unwrap();

        let totals = cart.recompute();
        assert_eq!(totals.total.to_fixed2(), "46.00");
        assert_eq!(totals.per_line[0].amount, Money::from_cents(2500));
        assert_eq!(totals.per_line[1].amount, Money::from_cents(2100));
        assert_eq!(totals.per_line[2].amount, Money::zero());
    }

    #[test]
    fn test_all_zero_total() {
        let cart = rental_cart();
        let totals = cart.recompute();
        assert_eq!(totals.total.to_fixed2(), "0.00");
        assert!(totals.per_line.iter().all(|l| l.amount.is_zero()));
    }

    #[test]
    fn test_two_tier_rounding() {
        // Two lines of 0.005 each: each displays as 0.01, but the total is
        // 0.01 (from 0.010), not 0.02.
        let mut cart = Cart::new(vec![
            CartLine::fixed("A", "A", UnitPrice::parse_lossy("0.005")),
            CartLine::fixed("B", "B", UnitPrice::parse_lossy("0.005")),
        ]);
        cart.step_quantity("A", 1).unwrap();
        cart.step_quantity("B", 1).unwrap();

        let totals = cart.recompute();
        assert_eq!(totals.per_line[0].amount.cents(), 1);
        assert_eq!(totals.per_line[1].amount.cents(), 1);
        assert_eq!(totals.total.cents(), 1);
    }

    #[test]
    fn test_quantity_is_clamped() {
        let mut cart = rental_cart();
        assert_eq!(cart.step_quantity("REG", -1).unwrap(), 0);
        assert_eq!(cart.step_quantity("REG", 5000).unwrap(), 999);
        assert_eq!(cart.step_quantity("REG", 1).unwrap(), 999);
        assert_eq!(cart.set_quantity_lossy("REG", "abc").unwrap(), 0);
        assert_eq!(cart.set_quantity_lossy("REG", "12 st").unwrap(), 12);
    }

    #[test]
    fn test_custom_line_editing() {
        let mut cart = rental_cart();
        assert_eq!(cart.line("CUSTOM").unwrap().label(), "CUSTOM");

        cart.set_custom_label("CUSTOM", "  Duikcomputer ").unwrap();
        assert_eq!(cart.line("CUSTOM").unwrap().label(), "Duikcomputer");

        let price = cart.set_custom_price("CUSTOM", "9,99").unwrap();
        assert_eq!(price, UnitPrice::from_cents(999));

        let price = cart.set_custom_price("CUSTOM", "gratis").unwrap();
        assert_eq!(price, UnitPrice::ZERO);
    }

    #[test]
    fn test_fixed_line_is_not_editable() {
        let mut cart = rental_cart();
        assert_eq!(
            cart.set_custom_label("REG", "x"),
            Err(CoreError::LineNotEditable("REG".to_string()))
        );
        assert!(cart.set_custom_price("REG", "1").is_err());
    }

    #[test]
    fn test_unknown_sku() {
        let mut cart = rental_cart();
        assert_eq!(
            cart.step_quantity("NOPE", 1),
            Err(CoreError::LineNotFound("NOPE".to_string()))
        );
    }

    #[test]
    fn test_duplicate_catalog_sku() {
        let result = Cart::from_catalog(
            vec![CartLine::fixed("CUSTOM", "Clash", UnitPrice::ZERO)],
            "CUSTOM",
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_remittance_label_drops_parenthetical() {
        let line = CartLine::fixed("REG", "Regulator (incl. hose)", UnitPrice::ZERO);
        assert_eq!(line.remittance_label(), "Regulator");
        let line = CartLine::fixed("X", "(all)", UnitPrice::ZERO);
        assert_eq!(line.remittance_label(), "");
    }

    #[test]
    fn test_reset_zeroes_lines() {
        let mut cart = rental_cart();
        cart.step_quantity("REG", 3).unwrap();
        cart.set_note("tot morgen");
        cart.remittance_override = Some(RemittanceOverride {
            text: "REF 1".into(),
            read_only: false,
        });

        cart.reset();
        assert_eq!(cart.lines().len(), 3);
        assert_eq!(cart.selected_lines().count(), 0);
        assert!(cart.note.is_none());
        assert!(cart.remittance_override.is_none());
    }

    #[test]
    fn test_override_effective_text() {
        let editable = RemittanceOverride {
            text: "  REF 42 ".into(),
            read_only: false,
        };
        assert_eq!(editable.effective_text(), Some("REF 42"));

        let read_only = RemittanceOverride {
            text: "REF 42".into(),
            read_only: true,
        };
        assert_eq!(read_only.effective_text(), None);

        let blank = RemittanceOverride::default();
        assert_eq!(blank.effective_text(), None);
    }

    #[test]
    fn test_cart_serializes_camel_case() {
        let cart = rental_cart();
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.get("remittanceOverride").is_some());
        assert_eq!(json["lines"][0]["unitPrice"], "12.5");
    }

    #[test]
    fn test_sub_cent_custom_price_total() {
        let mut cart = rental_cart();
        cart.set_custom_price("CUSTOM", "0.00004").unwrap();
        cart.step_quantity("CUSTOM", 999).unwrap();

        let totals = cart.recompute();
        assert_eq!(totals.total.to_fixed2(), "0.04");
    }

    #[test]
    fn test_deserialize_applies_coercions() {
        let json = serde_json::json!({
            "lines": [
                { "sku": "REG", "kind": "fixed", "label": "Regulator", "unitPrice": "12.5", "quantity": 5000 },
                { "sku": "CUSTOM", "kind": "custom", "unitPrice": "-3", "quantity": -2 }
            ],
            "note": null,
            "remittanceOverride": null
        });
        let cart: Cart = serde_json::from_value(json).unwrap();

        let reg = cart.line("REG").unwrap();
        assert_eq!(reg.quantity(), 999);
        assert_eq!(reg.unit_price(), UnitPrice::from_cents(1250));

        let custom = cart.line("CUSTOM").unwrap();
        assert_eq!(custom.quantity(), 0);
        assert_eq!(custom.unit_price(), UnitPrice::ZERO);
        assert_eq!(custom.label(), "CUSTOM");
    }

    #[test]
    fn test_serialized_cart_reads_back() {
        let mut cart = rental_cart();
        cart.step_quantity("REG", 2).unwrap();
        cart.set_custom_price("CUSTOM", "7.005").unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }
}
