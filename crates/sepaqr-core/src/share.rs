//! # Share Link Module
//!
//! Compact, URL-safe encoding of a payment payload so a customer can open the
//! QR code on their own phone.
//!
//! ## Token Format
//! ```text
//! payload (UTF-8) ──► base64 ──► '+' → '-'  ──► trailing '='* → '~'
//!                                '/' → '_'
//!
//! "é"   ──► "w6k="  ──► "w6k~"
//! ""    ──► ""      ──► ""
//! ```
//!
//! ## Share URL
//! ```text
//! https://kiosk.example/betaal/qr.html?p=QkNECjAwMQ...%7E&s=512&e=L
//!                              │        │               │     │
//!                              │        │               │     └─ error correction
//!                              │        │               └─ bitmap edge (px)
//!                              │        └─ token, form-urlencoded ('~' → %7E)
//!                              └─ viewer resource, resolved against the base
//! ```

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use url::{form_urlencoded, Url};

use crate::error::ShareLinkError;
use crate::validation::MAX_QR_SIZE;

/// Viewer page that renders a shared payload.
pub const DEFAULT_VIEWER_RESOURCE: &str = "qr.html";

/// Default edge length of a shared QR bitmap.
pub const DEFAULT_SHARE_SIZE: u32 = 512;

/// Marks a token whose base64 form ended in padding.
const PADDING_MARKER: char = '~';

const WHATSAPP_BASE: &str = "https://wa.me/?text=";

// =============================================================================
// Error Correction
// =============================================================================

/// QR error-correction level, a single letter on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ErrorCorrection {
    #[default]
    L,
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub fn letter(&self) -> char {
        match self {
            ErrorCorrection::L => 'L',
            ErrorCorrection::M => 'M',
            ErrorCorrection::Q => 'Q',
            ErrorCorrection::H => 'H',
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for ErrorCorrection {
    type Err = ShareLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(ErrorCorrection::L),
            "M" => Ok(ErrorCorrection::M),
            "Q" => Ok(ErrorCorrection::Q),
            "H" => Ok(ErrorCorrection::H),
            _ => Err(ShareLinkError::InvalidErrorCorrection(s.to_string())),
        }
    }
}

// =============================================================================
// Token Codec
// =============================================================================

/// Encodes `payload` as a URL-safe share token.
///
/// ```rust
/// use sepaqr_core::share::{decode_share_token, encode_share_token};
///
/// let token = encode_share_token("é");
/// assert_eq!(token, "w6k~");
/// assert_eq!(decode_share_token(&token).unwrap(), "é");
/// ```
pub fn encode_share_token(payload: &str) -> String {
    let encoded = STANDARD.encode(payload.as_bytes());
    let unpadded = encoded.trim_end_matches('=');

    let mut token: String = unpadded
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    if unpadded.len() != encoded.len() {
        token.push(PADDING_MARKER);
    }
    token
}

/// Exact inverse of [`encode_share_token`].
pub fn decode_share_token(token: &str) -> Result<String, ShareLinkError> {
    let mut encoded: String = token
        .trim_end_matches(PADDING_MARKER)
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    while encoded.len() % 4 != 0 {
        encoded.push('=');
    }

    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| ShareLinkError::InvalidBase64(e.to_string()))?;

    String::from_utf8(bytes).map_err(|_| ShareLinkError::InvalidUtf8)
}

// =============================================================================
// Share Link
// =============================================================================

/// How a shared QR code should be rendered by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShareOptions {
    pub size: u32,
    pub error_correction: ErrorCorrection,
    /// Relative to the base URL, e.g. `qr.html`.
    pub viewer_resource: String,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SHARE_SIZE,
            error_correction: ErrorCorrection::L,
            viewer_resource: DEFAULT_VIEWER_RESOURCE.to_string(),
        }
    }
}

/// The three query parameters of a share URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub token: String,
    pub size: u32,
    pub error_correction: ErrorCorrection,
}

impl ShareLink {
    pub fn new(payload: &str, size: u32, error_correction: ErrorCorrection) -> Self {
        Self {
            token: encode_share_token(payload),
            size,
            error_correction,
        }
    }

    /// Decodes the payload carried by this link.
    pub fn payload(&self) -> Result<String, ShareLinkError> {
        decode_share_token(&self.token)
    }

    /// Resolves `resource` against `base` and appends `p`, `s`, `e`.
    pub fn to_url(&self, base: &Url, resource: &str) -> Result<Url, ShareLinkError> {
        let mut url = base
            .join(resource)
            .map_err(|e| ShareLinkError::InvalidUrl(e.to_string()))?;

        url.query_pairs_mut()
            .clear()
            .append_pair("p", &self.token)
            .append_pair("s", &self.size.to_string())
            .append_pair("e", &self.error_correction.to_string());

        Ok(url)
    }

    /// Reads a share URL back. Missing `s` and `e` fall back to 512 and `L`.
    pub fn from_url(url: &Url) -> Result<Self, ShareLinkError> {
        let mut token = None;
        let mut size = DEFAULT_SHARE_SIZE;
        let mut error_correction = ErrorCorrection::L;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "p" => token = Some(value.into_owned()),
                "s" => size = parse_size(&value)?,
                "e" => error_correction = value.parse()?,
                _ => {}
            }
        }

        Ok(Self {
            token: token.ok_or(ShareLinkError::MissingParam("p"))?,
            size,
            error_correction,
        })
    }
}

fn parse_size(raw: &str) -> Result<u32, ShareLinkError> {
    match raw.trim().parse::<u32>() {
        Ok(size) if size > 0 && size <= MAX_QR_SIZE => Ok(size),
        _ => Err(ShareLinkError::InvalidSize(raw.to_string())),
    }
}

/// Builds the full share URL for `payload`.
///
/// ```rust
/// use sepaqr_core::share::{build_share_url, ShareOptions};
/// use url::Url;
///
/// let base = Url::parse("https://kiosk.example/betaal/index.html").unwrap();
/// let url = build_share_url("é", &ShareOptions::default(), &base).unwrap();
///
/// assert_eq!(url.as_str(), "https://kiosk.example/betaal/qr.html?p=w6k%7E&s=512&e=L");
/// ```
pub fn build_share_url(
    payload: &str,
    options: &ShareOptions,
    base: &Url,
) -> Result<Url, ShareLinkError> {
    ShareLink::new(payload, options.size, options.error_correction)
        .to_url(base, &options.viewer_resource)
}

/// Deep link used when no native share sheet is available.
pub fn whatsapp_fallback_url(share_url: &Url) -> String {
    let encoded: String = form_urlencoded::byte_serialize(share_url.as_str().as_bytes()).collect();
    format!("{}{}", WHATSAPP_BASE, encoded)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> Url {
        Url::parse("https://kiosk.example/betaal/index.html?debug=1").unwrap()
    }

    #[test]
    fn test_token_alphabet() {
        // Standard base64: "~~~" is "fn5+", "ÿÿ" is "w7/Dvw=="
        assert_eq!(encode_share_token("~~~"), "fn5-");
        assert_eq!(encode_share_token("ÿÿ"), "w7_Dvw~");
        assert_eq!(decode_share_token("fn5-").unwrap(), "~~~");
        assert_eq!(decode_share_token("w7_Dvw~").unwrap(), "ÿÿ");
    }

    #[test]
    fn test_padding_marker() {
        assert_eq!(encode_share_token("a"), "YQ~");
        assert_eq!(encode_share_token("ab"), "YWI~");
        assert_eq!(encode_share_token("abc"), "YWJj");
        assert_eq!(encode_share_token(""), "");
        assert_eq!(decode_share_token("").unwrap(), "");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_share_token("***"),
            Err(ShareLinkError::InvalidBase64(_))
        ));
        // "/w" → 0xff, not UTF-8
        assert_eq!(decode_share_token("_w~"), Err(ShareLinkError::InvalidUtf8));
    }

    #[test]
    fn test_build_share_url() {
        let payload = "BCD\n001\n1\nSCT\n\nA B\nBE68539007547034\nEUR46.00\n\n\nX\n";
        let url = build_share_url(payload, &ShareOptions::default(), &base()).unwrap();

        assert_eq!(url.path(), "/betaal/qr.html");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].0, "p");
        assert_eq!(pairs[1], ("s".to_string(), "512".to_string()));
        assert_eq!(pairs[2], ("e".to_string(), "L".to_string()));
    }

    #[test]
    fn test_marker_is_percent_encoded() {
        let url = build_share_url("a", &ShareOptions::default(), &base()).unwrap();
        assert_eq!(url.query(), Some("p=YQ%7E&s=512&e=L"));
    }

    #[test]
    fn test_share_link_from_url() {
        let options = ShareOptions {
            size: 256,
            error_correction: ErrorCorrection::H,
            ..ShareOptions::default()
        };
        let url = build_share_url("BCD\nX", &options, &base()).unwrap();

        let link = ShareLink::from_url(&url).unwrap();
        assert_eq!(link.size, 256);
        assert_eq!(link.error_correction, ErrorCorrection::H);
        assert_eq!(link.payload().unwrap(), "BCD\nX");
    }

    #[test]
    fn test_share_link_defaults_and_missing_token() {
        let url = Url::parse("https://kiosk.example/qr.html?p=YQ~").unwrap();
        let link = ShareLink::from_url(&url).unwrap();
        assert_eq!(link.size, DEFAULT_SHARE_SIZE);
        assert_eq!(link.error_correction, ErrorCorrection::L);
        assert_eq!(link.payload().unwrap(), "a");

        let url = Url::parse("https://kiosk.example/qr.html?s=512").unwrap();
        assert_eq!(
            ShareLink::from_url(&url),
            Err(ShareLinkError::MissingParam("p"))
        );
    }

    #[test]
    fn test_share_link_rejects_bad_params() {
        let url = Url::parse("https://kiosk.example/qr.html?p=YQ~&s=0").unwrap();
        assert!(matches!(
            ShareLink::from_url(&url),
            Err(ShareLinkError::InvalidSize(_))
        ));

        let url = Url::parse("https://kiosk.example/qr.html?p=YQ~&e=X").unwrap();
        assert!(matches!(
            ShareLink::from_url(&url),
            Err(ShareLinkError::InvalidErrorCorrection(_))
        ));
    }

    #[test]
    fn test_error_correction_letters() {
        assert_eq!("q".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Q);
        assert_eq!(ErrorCorrection::M.to_string(), "M");
        assert_eq!(ErrorCorrection::default(), ErrorCorrection::L);
        assert_eq!(serde_json::to_string(&ErrorCorrection::H).unwrap(), "\"H\"");
    }

    #[test]
    fn test_whatsapp_fallback_url() {
        let url = Url::parse("https://kiosk.example/qr.html?p=YQ%7E&s=512&e=L").unwrap();
        assert_eq!(
            whatsapp_fallback_url(&url),
            "https://wa.me/?text=https%3A%2F%2Fkiosk.example%2Fqr.html%3Fp%3DYQ%257E%26s%3D512%26e%3DL"
        );
    }

    proptest! {
        #[test]
        fn prop_token_round_trip(payload in "\\PC{0,200}") {
            let token = encode_share_token(&payload);
            prop_assert_eq!(decode_share_token(&token).unwrap(), payload);
        }

        #[test]
        fn prop_share_url_round_trip(payload in "\\PC{0,200}") {
            let url = build_share_url(&payload, &ShareOptions::default(), &base()).unwrap();
            let link = ShareLink::from_url(&url).unwrap();
            prop_assert_eq!(link.payload().unwrap(), payload);
        }
    }
}
