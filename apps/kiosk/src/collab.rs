//! # Collaborators
//!
//! Capabilities the kiosk needs from its host but never implements itself.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Injected Capabilities                                │
//! │                                                                         │
//! │  QrRenderer        payload text + size + level ──► PNG bitmap          │
//! │                                                                         │
//! │  ClipboardChain    [async clipboard API, textarea fallback, ...]       │
//! │                    tried in order, first success wins                   │
//! │                    all failed ──► CopyOutcome::Manual(text)            │
//! │                                                                         │
//! │  ShareSheet        native share dialog (title, url)                    │
//! │                    missing or failed ──► WhatsApp deep link            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use sepaqr_core::share::ErrorCorrection;

/// Errors reported by a collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollabError {
    /// The capability does not exist on this host.
    #[error("{0} is not available")]
    Unavailable(String),

    /// The user dismissed the dialog.
    #[error("Cancelled by user")]
    Cancelled,

    /// The capability exists but failed.
    #[error("{0}")]
    Failed(String),
}

/// Result type alias for collaborator calls.
pub type CollabResult<T> = Result<T, CollabError>;

// =============================================================================
// QR Renderer
// =============================================================================

/// A rendered QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrImage {
    pub width: u32,
    pub height: u32,
    pub error_correction: ErrorCorrection,
    /// PNG-encoded bitmap.
    pub png: Vec<u8>,
}

/// Turns payload text into a QR bitmap.
pub trait QrRenderer: Send + Sync {
    fn render(
        &self,
        text: &str,
        width: u32,
        height: u32,
        error_correction: ErrorCorrection,
    ) -> CollabResult<QrImage>;
}

// =============================================================================
// Clipboard
// =============================================================================

/// One way of putting text on the clipboard.
#[async_trait]
pub trait ClipboardProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn write(&self, text: &str) -> CollabResult<()>;
}

/// Result of a copy request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum CopyOutcome {
    /// Some provider took the text.
    Copied,
    /// Every provider failed; the UI shows the text for manual copying.
    Manual(String),
}

/// Clipboard providers in order of preference.
#[derive(Default)]
pub struct ClipboardChain {
    providers: Vec<Box<dyn ClipboardProvider>>,
}

impl ClipboardChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider with lower preference than those already present.
    pub fn with(mut self, provider: impl ClipboardProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Tries every provider in order.
    pub async fn copy(&self, text: &str) -> CopyOutcome {
        for provider in &self.providers {
            match provider.write(text).await {
                Ok(()) => {
                    debug!(provider = provider.name(), "Copied to clipboard");
                    return CopyOutcome::Copied;
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Clipboard provider failed");
                }
            }
        }
        warn!("No clipboard provider succeeded, falling back to manual copy");
        CopyOutcome::Manual(text.to_string())
    }
}

// =============================================================================
// Share Sheet
// =============================================================================

/// Native share dialog.
#[async_trait]
pub trait ShareSheet: Send + Sync {
    async fn share(&self, title: &str, url: &Url) -> CollabResult<()>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Renderer that stores the payload bytes as the "image".
    #[derive(Default)]
    pub struct EchoRenderer {
        pub calls: AtomicUsize,
    }

    impl QrRenderer for EchoRenderer {
        fn render(
            &self,
            text: &str,
            width: u32,
            height: u32,
            error_correction: ErrorCorrection,
        ) -> CollabResult<QrImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(QrImage {
                width,
                height,
                error_correction,
                png: text.as_bytes().to_vec(),
            })
        }
    }

    pub struct FailingRenderer;

    impl QrRenderer for FailingRenderer {
        fn render(&self, _: &str, _: u32, _: u32, _: ErrorCorrection) -> CollabResult<QrImage> {
            Err(CollabError::Failed("payload too long for QR".into()))
        }
    }

    /// Clipboard that records writes, or always fails.
    pub struct RecordingClipboard {
        pub name: &'static str,
        pub fail: bool,
        pub written: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingClipboard {
        pub fn ok(name: &'static str) -> Self {
            Self {
                name,
                fail: false,
                written: Arc::default(),
            }
        }

        pub fn failing(name: &'static str) -> Self {
            Self {
                name,
                fail: true,
                written: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl ClipboardProvider for RecordingClipboard {
        fn name(&self) -> &str {
            self.name
        }

        async fn write(&self, text: &str) -> CollabResult<()> {
            if self.fail {
                return Err(CollabError::Failed("permission denied".into()));
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_first_working_provider_wins() {
        let second = RecordingClipboard::ok("textarea");
        let written = second.written.clone();
        let chain = ClipboardChain::new()
            .with(RecordingClipboard::failing("async-api"))
            .with(second)
            .with(RecordingClipboard::ok("never-reached"));

        assert_eq!(chain.copy("BCD").await, CopyOutcome::Copied);
        assert_eq!(*written.lock().unwrap(), vec!["BCD".to_string()]);
    }

    #[tokio::test]
    async fn test_all_providers_failing_yields_manual() {
        let chain = ClipboardChain::new()
            .with(RecordingClipboard::failing("async-api"))
            .with(RecordingClipboard::failing("textarea"));

        assert_eq!(chain.copy("BCD").await, CopyOutcome::Manual("BCD".into()));
        assert_eq!(
            ClipboardChain::new().copy("x").await,
            CopyOutcome::Manual("x".into())
        );
    }

    #[test]
    fn test_copy_outcome_serialization() {
        let json = serde_json::to_value(CopyOutcome::Manual("BCD".into())).unwrap();
        assert_eq!(json["status"], "manual");
        assert_eq!(json["text"], "BCD");

        let json = serde_json::to_value(CopyOutcome::Copied).unwrap();
        assert_eq!(json["status"], "copied");
    }
}
