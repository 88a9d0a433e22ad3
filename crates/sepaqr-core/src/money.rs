//! # Money Module
//!
//! Monetary values and the lenient numeric parsing the kiosk needs.
//!
//! ## Two Precisions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UnitPrice  ── 1e-18 EUR ────►  exact line amount (qty × price)        │
//! │                                     │                                   │
//! │                         ┌───────────┴────────────┐                      │
//! │                         ▼                        ▼                      │
//! │             round once per line        sum unrounded, round once       │
//! │             (display "25,00")          (grand total → EUR25.00)        │
//! │                         │                        │                      │
//! │                         └──────► Money (cents) ◄─┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Freeform custom prices may carry more than two decimals (`7.005`,
//! `0.00004`). [`UnitPrice`] is read straight from the typed digits into a
//! fixed-point integer with 18 decimals, never through a float, so the grand
//! total is rounded once from the exact line products while each line is
//! rounded separately for display.
//!
//! ## Usage
//! ```rust
//! use sepaqr_core::money::{Money, UnitPrice};
//!
//! let price = UnitPrice::parse_lossy("12,50");
//! assert_eq!(price.line_amount(2).round_to_cents(), Money::from_cents(2500));
//! assert_eq!(Money::from_cents(2500).to_fixed2(), "25.00");
//! ```

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

/// Decimal places kept by a [`UnitPrice`].
const PRICE_DECIMALS: u32 = 18;

/// Sub-units of a [`UnitPrice`] per whole euro.
const PRICE_SCALE: i128 = 10i128.pow(PRICE_DECIMALS);

/// Sub-units of a [`UnitPrice`] per cent.
const PRICE_UNITS_PER_CENT: i128 = PRICE_SCALE / 100;

/// Upper bound for a unit price (one billion euro). `qty × price` summed over
/// a cart stays far inside i128.
const MAX_PRICE_UNITS: i128 = 1_000_000_000 * PRICE_SCALE;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in euro cents.
///
/// Every amount that is displayed or written into a payload flows through
/// this type. It is never built from a float except through
/// [`round_to_cents`], which applies the half-away-from-zero rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Serializes with a dot and exactly two decimals: `46.00`.
    ///
    /// This is the form the EPC amount field uses after the `EUR` prefix.
    ///
    /// ```rust
    /// use sepaqr_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(12340).to_fixed2(), "123.40");
    /// assert_eq!(Money::from_cents(5).to_fixed2(), "0.05");
    /// ```
    pub fn to_fixed2(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Line display form with a decimal comma: `25,00`.
    pub fn to_line_display(&self) -> String {
        self.to_fixed2().replace('.', ",")
    }
}

/// Display uses the kiosk's currency format, see [`format_currency`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_currency(*self))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

// =============================================================================
// Unit Price
// =============================================================================

/// A non-negative unit price in 10^-18 euro.
///
/// Serializes as a plain decimal string (`"12.5"`, `"0.00004"`) because the
/// raw integer does not fit a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UnitPrice(i128);

impl UnitPrice {
    /// Zero price (also what unparsable input becomes).
    pub const ZERO: UnitPrice = UnitPrice(0);

    /// Creates a unit price from whole cents. Negative input becomes zero.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Self::from_units((cents as i128).saturating_mul(PRICE_UNITS_PER_CENT))
    }

    /// Creates a unit price from 10^-18 euro.
    #[inline]
    pub const fn from_units(units: i128) -> Self {
        if units < 0 {
            UnitPrice(0)
        } else if units > MAX_PRICE_UNITS {
            UnitPrice(MAX_PRICE_UNITS)
        } else {
            UnitPrice(units)
        }
    }

    /// Parses operator input such as `12,50`, `7.005` or `15 EUR`.
    ///
    /// ## Rules
    /// - The first `,` is read as a decimal point
    /// - The longest leading number is used, trailing text is ignored
    /// - Unparsable, non-finite or negative input becomes zero
    /// - Digits are kept exactly up to 18 decimals, the 19th rounds half up
    /// - Anything from one billion euro upwards is capped there
    ///
    /// ```rust
    /// use sepaqr_core::money::UnitPrice;
    ///
    /// assert_eq!(UnitPrice::parse_lossy("12,50"), UnitPrice::from_cents(1250));
    /// assert_eq!(UnitPrice::parse_lossy("0.00004").to_string(), "0.00004");
    /// assert_eq!(UnitPrice::parse_lossy("abc"), UnitPrice::ZERO);
    /// assert_eq!(UnitPrice::parse_lossy("-4"), UnitPrice::ZERO);
    /// ```
    pub fn parse_lossy(raw: &str) -> Self {
        let normalized = normalize_decimal(raw);
        let Some(number) = scan_decimal(&normalized) else {
            return UnitPrice::ZERO;
        };

        // The float only classifies the value: sign, zero, overflow
        let approx = normalized[..number.end].parse::<f64>().unwrap_or(0.0);
        if !approx.is_finite() || approx <= 0.0 {
            return UnitPrice::ZERO;
        }
        if approx >= (MAX_PRICE_UNITS / PRICE_SCALE) as f64 {
            return UnitPrice(MAX_PRICE_UNITS);
        }

        Self::from_units(number.scaled_units(PRICE_DECIMALS))
    }

    /// Returns the raw 10^-18 euro value.
    #[inline]
    pub const fn units(&self) -> i128 {
        self.0
    }

    /// The exact (unrounded) amount for `quantity` units of this price.
    #[inline]
    pub fn line_amount(&self, quantity: i64) -> ExactAmount {
        ExactAmount(self.0.saturating_mul(quantity as i128))
    }
}

/// Plain decimal with a dot and no trailing zeros: `12.5`, `0`, `0.00004`.
impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / PRICE_SCALE;
        let frac = self.0 % PRICE_SCALE;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0width$}", frac, width = PRICE_DECIMALS as usize);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl Serialize for UnitPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Exact Amount
// =============================================================================

/// An amount with sub-cent precision, before rounding to [`Money`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExactAmount(i128);

impl ExactAmount {
    /// Rounds to cents, half away from zero.
    pub fn round_to_cents(&self) -> Money {
        let d = PRICE_UNITS_PER_CENT;
        let cents = if self.0 >= 0 {
            (self.0 + d / 2) / d
        } else {
            -((-self.0 + d / 2) / d)
        };
        Money(cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

impl Add for ExactAmount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        ExactAmount(self.0.saturating_add(other.0))
    }
}

impl AddAssign for ExactAmount {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl std::iter::Sum for ExactAmount {
    fn sum<I: Iterator<Item = ExactAmount>>(iter: I) -> Self {
        iter.fold(ExactAmount::default(), Add::add)
    }
}

// =============================================================================
// Free Functions
// =============================================================================

/// Rounds a float amount to cents, half away from zero. Non-finite input is 0.
///
/// ```rust
/// use sepaqr_core::money::round_to_cents;
///
/// assert_eq!(round_to_cents(46.0).to_fixed2(), "46.00");
/// assert_eq!(round_to_cents(0.125).cents(), 13);
/// assert_eq!(round_to_cents(f64::NAN).cents(), 0);
/// ```
pub fn round_to_cents(amount: f64) -> Money {
    if !amount.is_finite() {
        return Money::zero();
    }
    // f64::round is half away from zero
    Money((amount * 100.0).round() as i64)
}

/// nl-BE euro formatting: `€ 1.234,56`, `€ -5,50`.
pub fn format_currency(amount: Money) -> String {
    let abs = amount.cents().unsigned_abs();
    let whole = (abs / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_negative() { "-" } else { "" };
    format!("€ {}{},{:02}", sign, grouped, abs % 100)
}

/// [`format_currency`] for float totals; non-finite input formats as zero.
pub fn format_currency_f64(amount: f64) -> String {
    format_currency(round_to_cents(amount))
}

/// Integer clamp.
#[inline]
pub fn clamp(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

/// Parses the leading integer of `raw` (non-numeric → 0) and clamps it.
///
/// ```rust
/// use sepaqr_core::money::clamp_lossy;
///
/// assert_eq!(clamp_lossy("12", 0, 999), 12);
/// assert_eq!(clamp_lossy("5000", 0, 999), 999);
/// assert_eq!(clamp_lossy("x", 0, 999), 0);
/// ```
pub fn clamp_lossy(raw: &str, min: i64, max: i64) -> i64 {
    clamp(parse_int_lossy(raw), min, max)
}

/// Leading-integer parse: `" 42abc"` → 42, `"-3"` → -3, `"abc"` → 0.
pub fn parse_int_lossy(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    if negative {
        -value
    } else {
        value
    }
}

/// Leading-decimal parse with `,` accepted as the decimal separator.
///
/// Returns 0.0 when no number can be read or the result is not finite.
pub fn parse_decimal_lossy(raw: &str) -> f64 {
    let normalized = normalize_decimal(raw);
    let Some(number) = scan_decimal(&normalized) else {
        return 0.0;
    };

    match normalized[..number.end].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn normalize_decimal(raw: &str) -> String {
    raw.trim().replacen(',', ".", 1)
}

/// The longest leading number of a normalized string, split into its parts.
#[derive(Debug, PartialEq)]
struct ScannedDecimal {
    /// Byte length of the number text.
    end: usize,
    /// Integer digits followed by fraction digits.
    digits: String,
    /// Position of the decimal point within `digits`, after the exponent.
    point: i64,
}

impl ScannedDecimal {
    /// The value times 10^`decimals`, rounded half up on the next digit.
    ///
    /// Only meaningful for values already known to be non-negative and
    /// bounded, which keeps the digit loops short.
    fn scaled_units(&self, decimals: u32) -> i128 {
        let keep = self.point.saturating_add(i64::from(decimals));
        let mut units: i128 = 0;

        for (i, b) in self.digits.bytes().enumerate() {
            let i = i as i64;
            if i >= keep {
                if i == keep && b >= b'5' {
                    units = units.saturating_add(1);
                }
                return units;
            }
            units = units.saturating_mul(10).saturating_add(i128::from(b - b'0'));
        }

        for _ in (self.digits.len() as i64)..keep {
            units = units.saturating_mul(10);
        }
        units
    }
}

fn scan_decimal(normalized: &str) -> Option<ScannedDecimal> {
    let bytes = normalized.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = normalized[int_start..end].to_string();
    let int_len = digits.len() as i64;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits.push_str(&normalized[frac_start..frac_end]);
        end = frac_end;
    }
    if digits.is_empty() {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    let mut exponent: i64 = 0;
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        let negative = exp_end < bytes.len() && bytes[exp_end] == b'-';
        if exp_end < bytes.len() && (bytes[exp_end] == b'-' || bytes[exp_end] == b'+') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exponent = exponent
                .saturating_mul(10)
                .saturating_add(i64::from(bytes[exp_end] - b'0'));
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
            if negative {
                exponent = -exponent;
            }
        } else {
            exponent = 0;
        }
    }

    Some(ScannedDecimal {
        end,
        digits,
        point: int_len.saturating_add(exponent),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
