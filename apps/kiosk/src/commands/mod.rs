//! # Kiosk Commands Module
//!
//! Everything the UI adapter calls.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── cart.rs         ◄─── Quantities, custom line, note, remittance override
//! ├── stepper.rs      ◄─── Press-and-hold on the [-]/[+] buttons
//! ├── beneficiary.rs  ◄─── Payee name, IBAN, BIC
//! ├── generate.rs     ◄─── Payload rebuild and on-screen QR
//! └── share.rs        ◄─── Clipboard, share link, PNG download
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI adapter (web view, TUI, test)                                       │
//! │         │                                                               │
//! │         │  step_quantity(&session, "REG", 1)                            │
//! │         ▼                                                               │
//! │  fn step_quantity(                                                      │
//! │      state: &SessionState,     ◄── Passed by the adapter               │
//! │      sku: &str,                                                         │
//! │      delta: i64,                                                        │
//! │  ) -> ApiResult<CartResponse>                                           │
//! │         │                                                               │
//! │         │ (serde, camelCase)                                            │
//! │         ▼                                                               │
//! │  UI redraws the sheet, then asks the regen driver for a rebuild         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command takes only what it needs:
//! ```rust,ignore
//! // Only the session
//! fn get_cart(state: &SessionState)
//!
//! // Session plus a collaborator
//! fn generate(state: &SessionState, renderer: &dyn QrRenderer, qr: &QrConfig)
//!
//! // Session, config and an async collaborator
//! async fn share_qr_url(state: &SessionState, config: &KioskConfig, sheet: Option<&dyn ShareSheet>)
//! ```

pub mod beneficiary;
pub mod cart;
pub mod generate;
pub mod share;
pub mod stepper;
