//! # Stepper Command
//!
//! Press-and-hold on a `[-]`/`[+]` button.
//!
//! ```text
//! press ──► step now ──► 350 ms ──► step ──► 70 ms ──► step ──► ... ──► release
//!   │                      │                   │                          │
//!   └──── request() ───────┴──── request() ────┘        request() + settle()
//! ```
//!
//! Every step asks the regeneration driver for a debounced rebuild; release
//! flushes it, so the payload on screen matches the final quantity as soon as
//! the finger lifts. The UI adapter calls [`Stepper::tick`] from its own frame
//! timer; missed intervals are caught up in one go.

use std::time::Instant;

use tracing::debug;

use sepaqr_core::schedule::{HoldRepeater, StepDirection};

use crate::commands::cart::CartResponse;
use crate::error::ApiResult;
use crate::regen::RegenHandle;
use crate::state::SessionState;

/// Hold state of the one stepper button that can be held at a time.
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    repeater: HoldRepeater,
    sku: Option<String>,
    regen: Option<RegenHandle>,
}

impl Stepper {
    pub fn new(repeater: HoldRepeater) -> Self {
        Stepper {
            repeater,
            sku: None,
            regen: None,
        }
    }

    /// Routes steps and releases to a regeneration driver.
    pub fn with_regen(mut self, regen: RegenHandle) -> Self {
        self.regen = Some(regen);
        self
    }

    /// SKU of the line being held.
    pub fn held_sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    /// Starts a hold and applies the immediate step.
    ///
    /// Pressing while another button is held moves the hold to the new one.
    pub async fn press(
        &mut self,
        state: &SessionState,
        sku: &str,
        direction: StepDirection,
        now: Instant,
    ) -> ApiResult<CartResponse> {
        let response = state.with_session_mut(|s| -> ApiResult<CartResponse> {
            s.step_quantity(sku, direction.delta())?;
            Ok(CartResponse::from(&*s))
        })?;

        self.repeater.press(direction, now);
        self.sku = Some(sku.to_string());
        debug!(sku = %sku, ?direction, "Stepper pressed");

        self.request().await?;
        Ok(response)
    }

    /// Applies the repeat steps due at `now`. `None` when nothing was due.
    pub async fn tick(&mut self, state: &SessionState, now: Instant) -> ApiResult<Option<CartResponse>> {
        let (Some(sku), Some(direction)) = (self.sku.as_deref(), self.repeater.direction()) else {
            return Ok(None);
        };

        let steps = self.repeater.tick(now);
        if steps == 0 {
            return Ok(None);
        }

        let delta = direction.delta() * i64::from(steps);
        let response = state.with_session_mut(|s| -> ApiResult<CartResponse> {
            s.step_quantity(sku, delta)?;
            Ok(CartResponse::from(&*s))
        })?;

        self.request().await?;
        Ok(Some(response))
    }

    /// Ends the hold and forces the final rebuild.
    ///
    /// Returns the recomputed sheet if a hold was active.
    pub async fn release(&mut self, state: &SessionState) -> ApiResult<Option<CartResponse>> {
        let sku = self.sku.take();
        if !self.repeater.release() {
            return Ok(None);
        }
        debug!(sku = ?sku, "Stepper released");

        if let Some(regen) = &self.regen {
            regen.request().await?;
            regen.settle().await?;
        }
        Ok(Some(state.with_session(|s| CartResponse::from(s))))
    }

    async fn request(&self) -> ApiResult<()> {
        match &self.regen {
            Some(regen) => regen.request().await,
            None => Ok(()),
        }
    }
}
