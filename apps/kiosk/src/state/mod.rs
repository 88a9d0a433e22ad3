//! # State Module
//!
//! Application state for the kiosk.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌────────────────────────────────┐  │
//! │  │   SessionState               │   │   KioskConfig                  │  │
//! │  │                              │   │                                │  │
//! │  │   Arc<Mutex<Session>>        │   │   beneficiary defaults         │  │
//! │  │   • cart (lines, note,       │   │   qr / share settings          │  │
//! │  │     override)                │   │   timing                       │  │
//! │  │   • beneficiary              │   │   catalog                      │  │
//! │  │   • last payload + QR image  │   │                                │  │
//! │  └──────────────────────────────┘   └────────────────────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: shared by commands and the regeneration driver        │
//! │  • KioskConfig: read-only after loading                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::{
    BeneficiaryConfig, CatalogItem, KioskConfig, QrConfig, ShareConfig, TimingConfig,
};
pub use session::{Beneficiary, GeneratedPayload, Session, SessionState, CUSTOM_SKU};
