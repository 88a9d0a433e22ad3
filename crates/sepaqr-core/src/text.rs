//! # Text Module
//!
//! UTF-8 byte budgets and the ASCII transliteration used for every free-text
//! field that ends up inside the EPC payload.
//!
//! ## Why Bytes, Not Characters?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "vóór"  →  4 characters, 6 UTF-8 bytes                                 │
//! │                                                                         │
//! │  Banking apps enforce the 140 limit on the ENCODED field. Cutting at   │
//! │  byte 140 with a naive slice could split 'ó' (0xC3 0xB3) in half, so   │
//! │  the cut point is searched over character boundaries instead.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use unicode_normalization::UnicodeNormalization;

/// Exact encoded length of `s` in UTF-8.
#[inline]
pub fn utf8_byte_length(s: &str) -> usize {
    s.len()
}

/// Returns the longest prefix of `s` (by character count) that fits in
/// `max_bytes` UTF-8 bytes.
///
/// Binary search over character cut points: the byte length of a prefix is
/// non-decreasing in its character count, so the largest fitting count can
/// be found by comparing the byte length at the midpoint.
///
/// ```rust
/// use sepaqr_core::text::truncate_to_byte_budget;
///
/// assert_eq!(truncate_to_byte_budget("vóór", 3), "vó");
/// assert_eq!(truncate_to_byte_budget("vóór", 2), "v");
/// assert_eq!(truncate_to_byte_budget("abc", 10), "abc");
/// ```
pub fn truncate_to_byte_budget(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    // prefix_bytes[k] = byte length of the first k characters
    let prefix_bytes: Vec<usize> = std::iter::once(0)
        .chain(s.char_indices().skip(1).map(|(i, _)| i))
        .chain(std::iter::once(s.len()))
        .collect();

    let (mut lo, mut hi) = (0usize, prefix_bytes.len() - 1);
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        if prefix_bytes[mid] <= max_bytes {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    &s[..prefix_bytes[lo]]
}

/// Whitespace as matched by `\s` in browser regular expressions.
fn is_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '-' | '+' | ':' | '.' | ',') || is_space(c)
}

/// Reduces `s` to the uppercase ASCII subset banks accept in EPC text fields.
///
/// ## Steps
/// 1. NFKD decomposition
/// 2. Drop combining diacritical marks (U+0300–U+036F)
/// 3. `×` → `x`, em/en dash → `-`
/// 4. Drop everything outside `[A-Za-z0-9_\s/\-+:.,]`
/// 5. Collapse whitespace runs to one space, trim
/// 6. Uppercase
///
/// ```rust
/// use sepaqr_core::text::transliterate_to_ascii;
///
/// assert_eq!(transliterate_to_ascii("graag vóór 18u"), "GRAAG VOOR 18U");
/// assert_eq!(transliterate_to_ascii("2×  fles – 12L"), "2X FLES - 12L");
/// ```
pub fn transliterate_to_ascii(s: &str) -> String {
    let filtered = s
        .nfkd()
        .filter(|c| !is_combining_diacritic(*c))
        .map(|c| match c {
            '×' => 'x',
            '—' | '–' => '-',
            other => other,
        })
        .filter(|c| is_allowed(*c));

    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in filtered {
        if is_space(c) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
