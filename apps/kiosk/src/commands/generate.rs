//! # Generate Command
//!
//! Rebuilds the payment payload and renders the on-screen QR code.
//!
//! ```text
//! recompute totals ─► Final remittance ─► EPC payload ─► QrRenderer (256×256, L)
//!                                              │                 │
//!                                              ▼                 ▼
//!                                     session.generated   session.qr_image
//! ```
//!
//! The payload is stored before rendering, so a renderer failure never costs
//! the operator the copyable text.

use serde::Serialize;
use tracing::warn;

use crate::collab::{QrImage, QrRenderer};
use crate::commands::cart::CartResponse;
use crate::state::{GeneratedPayload, QrConfig, SessionState};

/// Result of one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub generated: GeneratedPayload,
    pub cart: CartResponse,
    /// `None` when the renderer failed.
    pub qr: Option<QrImage>,
}

/// Generates the payload and renders it.
pub fn generate(state: &SessionState, renderer: &dyn QrRenderer, qr: &QrConfig) -> GenerateResponse {
    let (generated, cart) = state.with_session_mut(|s| {
        let generated = s.generate();
        (generated, CartResponse::from(&*s))
    });

    // Rendering happens outside the lock
    let image = match renderer.render(&generated.payload, qr.size, qr.size, qr.error_correction) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(error = %e, "QR rendering failed, payload is still available");
            None
        }
    };

    state.with_session_mut(|s| s.set_qr_image(image.clone()));

    GenerateResponse {
        generated,
        cart,
        qr: image,
    }
}
