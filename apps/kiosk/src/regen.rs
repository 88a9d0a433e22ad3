//! # Regeneration Driver
//!
//! Runs the payload rebuild behind a coalesce-latest debouncer so a burst of
//! edits (typing, stepper holds) costs one rebuild and one QR render.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Regeneration Driver                                 │
//! │                                                                         │
//! │  UI edit ──┐                                                            │
//! │            │ Request                                                    │
//! │  UI edit ──┼──────────────▶ ┌──────────────────────┐                    │
//! │            │                │                      │                    │
//! │  release ──┘ Settle         │   RegenDriver task   │                    │
//! │                             │                      │                    │
//! │                             │  Debouncer           │                    │
//! │                             │  deadline = last     │                    │
//! │                             │    request + 100 ms  │                    │
//! │                             └──────────┬───────────┘                    │
//! │                                        │ deadline hit / Settle          │
//! │                                        ▼                                │
//! │                        generate(session, renderer, qr)                  │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                   watch::Receiver<Option<GenerateResponse>>             │
//! │                                                                         │
//! │  Shutdown (or every handle dropped) flushes a pending request first.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The output is a `watch` channel holding only the latest rebuild. Publishing
//! never waits on a reader, so an adapter that ignores the receiver cannot
//! stall the driver or the handles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use sepaqr_core::schedule::Debouncer;

use crate::collab::QrRenderer;
use crate::commands::generate::{generate, GenerateResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::{QrConfig, SessionState};

// =============================================================================
// Constants
// =============================================================================

/// Capacity of the command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Placeholder wake-up while nothing is pending (the branch is disabled).
const IDLE_WAKE: Duration = Duration::from_secs(3600);

// =============================================================================
// Handle
// =============================================================================

/// Handle for controlling the driver.
#[derive(Debug, Clone)]
pub struct RegenHandle {
    cmd_tx: mpsc::Sender<RegenCommand>,
}

#[derive(Debug)]
enum RegenCommand {
    /// Schedule a rebuild, superseding any pending one.
    Request,
    /// Run the pending rebuild now.
    Settle,
    /// Flush and stop.
    Shutdown,
}

impl RegenHandle {
    /// Schedules a rebuild after the quiet window.
    pub async fn request(&self) -> ApiResult<()> {
        self.send(RegenCommand::Request).await
    }

    /// Runs a pending rebuild immediately. No-op if none is pending.
    pub async fn settle(&self) -> ApiResult<()> {
        self.send(RegenCommand::Settle).await
    }

    /// Flushes a pending rebuild and stops the driver.
    pub async fn shutdown(&self) -> ApiResult<()> {
        self.send(RegenCommand::Shutdown).await
    }

    async fn send(&self, cmd: RegenCommand) -> ApiResult<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| ApiError::internal("Regeneration driver stopped"))
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Owns the debouncer and performs rebuilds against the shared session.
pub struct RegenDriver {
    session: SessionState,
    renderer: Arc<dyn QrRenderer>,
    qr: QrConfig,
    debouncer: Debouncer,
    generate_on_start: bool,
}

/// Latest rebuild published by the driver. `None` until the first one.
pub type RegenReceiver = watch::Receiver<Option<GenerateResponse>>;

impl RegenDriver {
    pub fn new(
        session: SessionState,
        renderer: Arc<dyn QrRenderer>,
        qr: QrConfig,
        debouncer: Debouncer,
    ) -> Self {
        RegenDriver {
            session,
            renderer,
            qr,
            debouncer,
            generate_on_start: false,
        }
    }

    /// Builds once in `start()`, before any edit, so copy and share work
    /// straight away.
    pub fn generate_on_start(mut self, enabled: bool) -> Self {
        self.generate_on_start = enabled;
        self
    }

    /// Spawns the driver. The receiver always holds the latest rebuild and
    /// reports `changed()` errors once the driver has stopped.
    pub fn start(self) -> (RegenHandle, RegenReceiver) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let initial = if self.generate_on_start {
            debug!("Initial generation");
            Some(generate(&self.session, self.renderer.as_ref(), &self.qr))
        } else {
            None
        };
        let (out_tx, out_rx) = watch::channel(initial);

        tokio::spawn(async move {
            self.run(cmd_rx, out_tx).await;
        });

        (RegenHandle { cmd_tx }, out_rx)
    }

    /// Main driver loop.
    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<RegenCommand>,
        out_tx: watch::Sender<Option<GenerateResponse>>,
    ) {
        info!(window_ms = self.debouncer.window().as_millis() as u64, "Regeneration driver started");

        loop {
            let deadline = self.debouncer.deadline().map(Instant::from_std);
            let wake_at = deadline.unwrap_or_else(|| Instant::now() + IDLE_WAKE);

            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(RegenCommand::Request) => {
                            self.debouncer.request(Instant::now().into_std());
                        }
                        Some(RegenCommand::Settle) => {
                            if self.debouncer.settle() {
                                debug!("Settling pending regeneration");
                                self.fire(&out_tx);
                            }
                        }
                        Some(RegenCommand::Shutdown) | None => {
                            info!("Regeneration driver shutting down");
                            if self.debouncer.settle() {
                                self.fire(&out_tx);
                            }
                            break;
                        }
                    }
                }
                _ = sleep_until(wake_at), if deadline.is_some() => {
                    if self.debouncer.poll(Instant::now().into_std()) {
                        self.fire(&out_tx);
                    }
                }
            }
        }
    }

    /// Rebuilds and publishes one payload.
    fn fire(&self, out_tx: &watch::Sender<Option<GenerateResponse>>) {
        let response = generate(&self.session, self.renderer.as_ref(), &self.qr);
        debug!(total = %response.generated.total.to_fixed2(), "Regenerated payload");

        // Replaces the previous value even with no receiver left
        out_tx.send_replace(Some(response));
    }
}
