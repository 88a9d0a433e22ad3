//! # SEPA QR Kiosk Library
//!
//! Orchestration layer between the counter UI and `sepaqr-core`.
//! A UI adapter (web view, terminal, tests) opens a [`Kiosk`], calls the
//! functions in [`commands`] and injects the capabilities in [`collab`].
//!
//! ## Module Organization
//! ```text
//! sepaqr_kiosk/
//! ├── lib.rs          ◄─── You are here (tracing setup, Kiosk entry point)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── Counter session (cart, beneficiary, last payload)
//! │   └── config.rs   ◄─── kiosk.toml + SEPAQR_* environment
//! ├── commands/       ◄─── Everything the UI adapter calls
//! ├── collab.rs       ◄─── QR renderer, clipboard chain, share sheet
//! ├── regen.rs        ◄─── Debounced regeneration driver
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Kiosk Startup                                     │
//! │                                                                         │
//! │  1. init_tracing() ───────────────────────────────────────────────────► │
//! │     • Default: info,sepaqr=debug, overridable with RUST_LOG             │
//! │                                                                         │
//! │  2. Kiosk::load(path) ────────────────────────────────────────────────► │
//! │     • defaults ◄─ kiosk.toml ◄─ SEPAQR_* env, then validated            │
//! │     • Linux: ~/.config/sepaqr/kiosk.toml                                │
//! │                                                                         │
//! │  3. Session opened ───────────────────────────────────────────────────► │
//! │     • catalog lines + one custom line, all at quantity 0                │
//! │                                                                         │
//! │  4. kiosk.start_regen(renderer) ──────────────────────────────────────► │
//! │     • one initial generation, so copy and share work at once            │
//! │     • edits ─► handle.request(), stepper release ─► handle.settle()     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod collab;
pub mod commands;
pub mod error;
pub mod regen;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use collab::QrRenderer;
use commands::stepper::Stepper;
use error::ApiResult;
use regen::{RegenDriver, RegenHandle, RegenReceiver};
use state::{KioskConfig, Session, SessionState};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=sepaqr_core=trace` - Show remittance truncation details
/// - Default: `info,sepaqr=debug`
///
/// Calling it twice is harmless; the second call leaves the first subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sepaqr=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// A configured kiosk with its counter session.
#[derive(Debug, Clone)]
pub struct Kiosk {
    pub config: KioskConfig,
    pub session: SessionState,
}

impl Kiosk {
    /// Opens a session for an already loaded configuration.
    pub fn open(config: KioskConfig) -> ApiResult<Self> {
        let session = Session::new(&config)?;
        info!(
            session_id = %session.id(),
            beneficiary = %config.beneficiary.name,
            catalog = config.catalog.len(),
            "Kiosk session opened"
        );

        Ok(Kiosk {
            config,
            session: SessionState::new(session),
        })
    }

    /// Loads the configuration (falling back to defaults) and opens a session.
    pub fn load(config_path: Option<PathBuf>) -> ApiResult<Self> {
        Self::open(KioskConfig::load_or_default(config_path))
    }

    /// Stepper using the configured hold timing, feeding `regen`.
    pub fn stepper(&self, regen: RegenHandle) -> Stepper {
        Stepper::new(self.config.hold_repeater()).with_regen(regen)
    }

    /// Generates once and starts the debounced regeneration driver for this
    /// session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_regen(&self, renderer: Arc<dyn QrRenderer>) -> (RegenHandle, RegenReceiver) {
        RegenDriver::new(
            self.session.clone(),
            renderer,
            self.config.qr.clone(),
            self.config.debouncer(),
        )
        .generate_on_start(true)
        .start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::tests::{EchoRenderer, RecordingClipboard};
    use crate::collab::{ClipboardChain, CopyOutcome};
    use crate::commands::cart::step_quantity;
    use crate::commands::share::{copy_payload, share_url};
    use sepaqr_core::schedule::StepDirection;
    use sepaqr_core::share::ShareLink;

    #[test]
    fn test_open_with_defaults() {
        let kiosk = Kiosk::open(KioskConfig::default()).unwrap();
        let lines = kiosk.session.with_session(|s| s.cart().lines().len());
        assert_eq!(lines, 3);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_regenerate_share() {
        let kiosk = Kiosk::open(KioskConfig::default()).unwrap();
        let (regen, mut rx) = kiosk.start_regen(Arc::new(EchoRenderer::default()));

        step_quantity(&kiosk.session, "REG", 2).unwrap();
        regen.request().await.unwrap();
        step_quantity(&kiosk.session, "BCD", 3).unwrap();
        regen.request().await.unwrap();

        rx.changed().await.unwrap();
        let response = rx.borrow_and_update().clone().unwrap();
        assert!(response.generated.payload.contains("\nEUR46.00\n"));

        let url = share_url(&kiosk.session, &kiosk.config).unwrap();
        let link = ShareLink::from_url(&url).unwrap();
        assert_eq!(link.payload().unwrap(), response.generated.payload);

        regen.shutdown().await.unwrap();
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_share_works_right_after_start() {
        let kiosk = Kiosk::open(KioskConfig::default()).unwrap();
        let (_regen, rx) = kiosk.start_regen(Arc::new(EchoRenderer::default()));

        let url = share_url(&kiosk.session, &kiosk.config).unwrap();
        let link = ShareLink::from_url(&url).unwrap();
        assert!(link.payload().unwrap().contains("\nEUR0.00\n"));

        let clipboard = ClipboardChain::new().with(RecordingClipboard::ok("api"));
        assert_eq!(copy_payload(&kiosk.session, &clipboard).await.unwrap(), CopyOutcome::Copied);
        assert!(rx.borrow().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stepper_feeds_regen() {
        let kiosk = Kiosk::open(KioskConfig::default()).unwrap();
        let (regen, mut rx) = kiosk.start_regen(Arc::new(EchoRenderer::default()));
        let mut stepper = kiosk.stepper(regen);

        stepper
            .press(&kiosk.session, "BCD", StepDirection::Up, std::time::Instant::now())
            .await
            .unwrap();
        stepper.release(&kiosk.session).await.unwrap();

        rx.changed().await.unwrap();
        let response = rx.borrow_and_update().clone().unwrap();
        assert!(response.generated.payload.contains("\nEUR7.00\n"));
    }
}
