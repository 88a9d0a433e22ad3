//! # Share Commands
//!
//! Getting the last payload out of the kiosk: clipboard, share link, PNG.
//!
//! ## Share Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  share_qr_url()                                                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  payload generated? ── no ──► NOTHING_GENERATED                        │
//! │        │ yes                                                            │
//! │        ▼                                                                │
//! │  <viewer>/qr.html?p=<token>&s=512&e=L                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  share sheet present? ── no ─────────────────┐                          │
//! │        │ yes                                 │                          │
//! │        ▼                                     ▼                          │
//! │  share(title, url) ── failed/cancelled ──► https://wa.me/?text=<url>   │
//! │        │ ok                                                             │
//! │        ▼                                                                │
//! │  Shared                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use sepaqr_core::share::{build_share_url, whatsapp_fallback_url};

use crate::collab::{ClipboardChain, CopyOutcome, ShareSheet};
use crate::error::{ApiError, ApiResult};
use crate::state::{KioskConfig, SessionState};

/// File name offered when saving the QR image.
pub const QR_IMAGE_FILE_NAME: &str = "betaal-qr.png";

/// How a share request ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShareOutcome {
    /// The native share sheet took the link.
    Shared { url: String },
    /// No share sheet, or it failed; the UI opens `whatsapp_url`.
    Fallback { url: String, whatsapp_url: String },
}

/// A QR image ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedImage {
    pub file_name: String,
    pub png: Vec<u8>,
}

fn last_payload(state: &SessionState) -> ApiResult<String> {
    state.with_session(|s| s.require_generated().map(|g| g.payload.clone()))
}

/// Copies the last payload text.
pub async fn copy_payload(state: &SessionState, clipboard: &ClipboardChain) -> ApiResult<CopyOutcome> {
    let payload = last_payload(state)?;
    debug!(bytes = payload.len(), "copy_payload command");
    Ok(clipboard.copy(&payload).await)
}

/// Share URL for the last payload.
pub fn share_url(state: &SessionState, config: &KioskConfig) -> ApiResult<Url> {
    let payload = last_payload(state)?;
    let base = config.viewer_base()?;
    Ok(build_share_url(&payload, &config.share_options(), &base)?)
}

/// Copies the share URL.
pub async fn copy_share_link(
    state: &SessionState,
    config: &KioskConfig,
    clipboard: &ClipboardChain,
) -> ApiResult<CopyOutcome> {
    let url = share_url(state, config)?;
    debug!(url = %url, "copy_share_link command");
    Ok(clipboard.copy(url.as_str()).await)
}

/// Offers the share URL through the share sheet, or the WhatsApp fallback.
pub async fn share_qr_url(
    state: &SessionState,
    config: &KioskConfig,
    sheet: Option<&dyn ShareSheet>,
) -> ApiResult<ShareOutcome> {
    let url = share_url(state, config)?;

    if let Some(sheet) = sheet {
        match sheet.share(&config.share.title, &url).await {
            Ok(()) => {
                info!("Share link handed to share sheet");
                return Ok(ShareOutcome::Shared {
                    url: url.to_string(),
                });
            }
            Err(e) => warn!(error = %e, "Share sheet failed, falling back to WhatsApp"),
        }
    } else {
        debug!("No share sheet available, falling back to WhatsApp");
    }

    Ok(ShareOutcome::Fallback {
        whatsapp_url: whatsapp_fallback_url(&url),
        url: url.to_string(),
    })
}

/// The last rendered QR image as a PNG download.
pub fn save_qr_image(state: &SessionState) -> ApiResult<SavedImage> {
    state.with_session(|s| {
        let image = s.qr_image().ok_or_else(ApiError::nothing_generated)?;
        Ok(SavedImage {
            file_name: QR_IMAGE_FILE_NAME.to_string(),
            png: image.png.clone(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::tests::{EchoRenderer, RecordingClipboard};
    use crate::collab::{CollabError, CollabResult};
    use crate::commands::cart::step_quantity;
    use crate::commands::generate::generate;
    use crate::error::ErrorCode;
    use crate::state::{QrConfig, Session};
    use async_trait::async_trait;
    use sepaqr_core::share::ShareLink;
    use std::sync::Mutex;

    struct FakeSheet {
        result: CollabResult<()>,
        shared: Mutex<Vec<(String, String)>>,
    }

    impl FakeSheet {
        fn new(result: CollabResult<()>) -> Self {
            FakeSheet {
                result,
                shared: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ShareSheet for FakeSheet {
        async fn share(&self, title: &str, url: &Url) -> CollabResult<()> {
            self.shared
                .lock()
                .unwrap()
                .push((title.to_string(), url.to_string()));
            self.result.clone()
        }
    }

    fn config() -> KioskConfig {
        let mut config = KioskConfig::default();
        config.share.viewer_base_url = "https://kiosk.example/betaal/".to_string();
        config
    }

    fn generated_state() -> SessionState {
        let state = SessionState::new(Session::new(&config()).unwrap());
        step_quantity(&state, "REG", 1).unwrap();
        generate(&state, &EchoRenderer::default(), &QrConfig::default());
        state
    }

    fn empty_state() -> SessionState {
        SessionState::new(Session::new(&config()).unwrap())
    }

    #[tokio::test]
    async fn test_nothing_generated() {
        let state = empty_state();
        let clipboard = ClipboardChain::new().with(RecordingClipboard::ok("api"));

        let err = copy_payload(&state, &clipboard).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NothingGenerated);

        let err = share_qr_url(&state, &config(), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NothingGenerated);

        let err = save_qr_image(&state).unwrap_err();
        assert_eq!(err.code, ErrorCode::NothingGenerated);
    }

    #[tokio::test]
    async fn test_copy_payload() {
        let state = generated_state();
        let provider = RecordingClipboard::ok("api");
        let written = provider.written.clone();
        let clipboard = ClipboardChain::new().with(provider);

        assert_eq!(copy_payload(&state, &clipboard).await.unwrap(), CopyOutcome::Copied);
        let expected = state.with_session(|s| s.generated().unwrap().payload.clone());
        assert_eq!(*written.lock().unwrap(), vec![expected]);
    }

    #[tokio::test]
    async fn test_copy_payload_manual_fallback() {
        let state = generated_state();
        let clipboard = ClipboardChain::new().with(RecordingClipboard::failing("api"));

        match copy_payload(&state, &clipboard).await.unwrap() {
            CopyOutcome::Manual(text) => assert!(text.starts_with("BCD\n")),
            other => panic!("expected manual copy, got {:?}", other),
        }
    }

    #[test]
    fn test_share_url_round_trips() {
        let state = generated_state();
        let url = share_url(&state, &config()).unwrap();

        assert!(url.as_str().starts_with("https://kiosk.example/betaal/qr.html?p="));
        let link = ShareLink::from_url(&url).unwrap();
        assert_eq!(link.size, 512);
        let expected = state.with_session(|s| s.generated().unwrap().payload.clone());
        assert_eq!(link.payload().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_copy_share_link() {
        let state = generated_state();
        let provider = RecordingClipboard::ok("api");
        let written = provider.written.clone();
        let clipboard = ClipboardChain::new().with(provider);

        copy_share_link(&state, &config(), &clipboard).await.unwrap();
        assert!(written.lock().unwrap()[0].contains("qr.html?p="));
    }

    #[tokio::test]
    async fn test_share_sheet_success() {
        let state = generated_state();
        let sheet = FakeSheet::new(Ok(()));

        let outcome = share_qr_url(&state, &config(), Some(&sheet)).await.unwrap();
        assert!(matches!(outcome, ShareOutcome::Shared { .. }));

        let shared = sheet.shared.lock().unwrap();
        assert_eq!(shared[0].0, "Ieper Dives Betaal-QR");
    }

    #[tokio::test]
    async fn test_share_falls_back_to_whatsapp() {
        let state = generated_state();

        let cancelled = FakeSheet::new(Err(CollabError::Cancelled));
        let outcome = share_qr_url(&state, &config(), Some(&cancelled)).await.unwrap();
        match outcome {
            ShareOutcome::Fallback { url, whatsapp_url } => {
                assert!(whatsapp_url.starts_with("https://wa.me/?text=https%3A%2F%2Fkiosk.example"));
                assert!(!url.contains('~'));
            }
            other => panic!("expected fallback, got {:?}", other),
        }

        let outcome = share_qr_url(&state, &config(), None).await.unwrap();
        assert!(matches!(outcome, ShareOutcome::Fallback { .. }));
    }

    #[test]
    fn test_save_qr_image() {
        let state = generated_state();
        let saved = save_qr_image(&state).unwrap();
        assert_eq!(saved.file_name, "betaal-qr.png");
        assert!(!saved.png.is_empty());
    }

    #[test]
    fn test_bad_viewer_url_is_config_error() {
        let state = generated_state();
        let mut config = config();
        config.share.viewer_base_url = "not a url".to_string();

        let err = share_url(&state, &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }
}
