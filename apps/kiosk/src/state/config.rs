//! # Kiosk Configuration
//!
//! Settings the counter starts with, loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SEPAQR_*`)
//! 2. Config file (`kiosk.toml`)
//! 3. Defaults (this file)
//!
//! ## Example `kiosk.toml`
//! ```toml
//! [beneficiary]
//! name = "Ieper Dives"
//! iban = "BE68 5390 0754 7034"
//! bic = "GKCCBEBB"
//!
//! [qr]
//! size = 256
//! error_correction = "L"
//!
//! [share]
//! viewer_base_url = "https://kiosk.example/betaal/"
//! title = "Ieper Dives Betaal-QR"
//!
//! [timing]
//! debounce_ms = 100
//!
//! [[catalog]]
//! sku = "REG"
//! label = "Regulator (incl. hose)"
//! price_cents = 1250
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after loading, so no mutex needed.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use sepaqr_core::cart::CartLine;
use sepaqr_core::money::UnitPrice;
use sepaqr_core::schedule::{Debouncer, HoldRepeater};
use sepaqr_core::share::{ErrorCorrection, ShareOptions, DEFAULT_SHARE_SIZE, DEFAULT_VIEWER_RESOURCE};
use sepaqr_core::validation::{
    validate_beneficiary_name, validate_iban_format, validate_label, validate_qr_size,
    validate_sku, validate_unique_skus,
};
use sepaqr_core::ValidationError;

use crate::error::{ConfigError, ConfigResult};
use crate::state::session::CUSTOM_SKU;

const CONFIG_FILE_NAME: &str = "kiosk.toml";

// =============================================================================
// Root Configuration
// =============================================================================

/// Complete kiosk configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KioskConfig {
    /// Who receives the transfer.
    #[serde(default)]
    pub beneficiary: BeneficiaryConfig,

    /// On-screen QR code.
    #[serde(default)]
    pub qr: QrConfig,

    /// Share link and viewer page.
    #[serde(default)]
    pub share: ShareConfig,

    /// Debounce and stepper timing.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Rental items, in display order.
    #[serde(default = "default_catalog")]
    pub catalog: Vec<CatalogItem>,
}

// =============================================================================
// Sections
// =============================================================================

/// Default beneficiary shown in the payment form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficiaryConfig {
    pub name: String,
    pub iban: String,
    #[serde(default)]
    pub bic: String,
}

impl Default for BeneficiaryConfig {
    fn default() -> Self {
        BeneficiaryConfig {
            name: "Ieper Dives".to_string(),
            iban: "BE68 5390 0754 7034".to_string(),
            bic: "GKCCBEBB".to_string(),
        }
    }
}

/// On-screen QR rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrConfig {
    /// Edge length in pixels (square).
    #[serde(default = "default_qr_size")]
    pub size: u32,

    #[serde(default)]
    pub error_correction: ErrorCorrection,
}

fn default_qr_size() -> u32 {
    256
}

impl Default for QrConfig {
    fn default() -> Self {
        QrConfig {
            size: default_qr_size(),
            error_correction: ErrorCorrection::L,
        }
    }
}

/// Share link settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Where the viewer page is served; the resource is resolved against it.
    #[serde(default = "default_viewer_base_url")]
    pub viewer_base_url: String,

    #[serde(default = "default_viewer_resource")]
    pub viewer_resource: String,

    /// Edge length of the shared QR.
    #[serde(default = "default_share_size")]
    pub size: u32,

    #[serde(default)]
    pub error_correction: ErrorCorrection,

    /// Title passed to the native share sheet.
    #[serde(default = "default_share_title")]
    pub title: String,
}

fn default_viewer_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_viewer_resource() -> String {
    DEFAULT_VIEWER_RESOURCE.to_string()
}

fn default_share_size() -> u32 {
    DEFAULT_SHARE_SIZE
}

fn default_share_title() -> String {
    "Ieper Dives Betaal-QR".to_string()
}

impl Default for ShareConfig {
    fn default() -> Self {
        ShareConfig {
            viewer_base_url: default_viewer_base_url(),
            viewer_resource: default_viewer_resource(),
            size: default_share_size(),
            error_correction: ErrorCorrection::L,
            title: default_share_title(),
        }
    }
}

/// UI timing, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_hold_delay_ms")]
    pub hold_delay_ms: u64,

    #[serde(default = "default_hold_interval_ms")]
    pub hold_interval_ms: u64,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_hold_delay_ms() -> u64 {
    350
}

fn default_hold_interval_ms() -> u64 {
    70
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            debounce_ms: default_debounce_ms(),
            hold_delay_ms: default_hold_delay_ms(),
            hold_interval_ms: default_hold_interval_ms(),
        }
    }
}

/// One fixed-price rental item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub sku: String,
    pub label: String,
    pub price_cents: i64,
}

impl CatalogItem {
    pub fn new(sku: &str, label: &str, price_cents: i64) -> Self {
        CatalogItem {
            sku: sku.to_string(),
            label: label.to_string(),
            price_cents,
        }
    }

    pub fn to_cart_line(&self) -> CartLine {
        CartLine::fixed(
            self.sku.clone(),
            self.label.clone(),
            UnitPrice::from_cents(self.price_cents),
        )
    }
}

fn default_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new("REG", "Regulator (incl. hose)", 1250),
        CatalogItem::new("BCD", "Trimvest", 700),
    ]
}

impl Default for KioskConfig {
    fn default() -> Self {
        KioskConfig {
            beneficiary: BeneficiaryConfig::default(),
            qr: QrConfig::default(),
            share: ShareConfig::default(),
            timing: TimingConfig::default(),
            catalog: default_catalog(),
        }
    }
}

// =============================================================================
// Loading & Saving
// =============================================================================

impl KioskConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (kiosk.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading kiosk config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns the defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load kiosk config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses TOML text; missing sections take their defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration as pretty TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Kiosk config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_beneficiary_name(&self.beneficiary.name)?;
        validate_iban_format(&self.beneficiary.iban)?;
        validate_qr_size(self.qr.size)?;
        validate_qr_size(self.share.size)?;

        for item in &self.catalog {
            validate_sku(&item.sku)?;
            validate_label(&item.label)?;
            if item.price_cents < 0 {
                return Err(ValidationError::OutOfRange {
                    field: format!("price of {}", item.sku),
                    min: 0,
                    max: i64::MAX,
                }
                .into());
            }
        }
        validate_unique_skus(
            self.catalog
                .iter()
                .map(|i| i.sku.as_str())
                .chain(std::iter::once(CUSTOM_SKU)),
        )?;

        self.viewer_base()?;

        if self.share.viewer_resource.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "viewer resource".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Applies `SEPAQR_*` overrides read through `lookup`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("SEPAQR_BENEFICIARY_NAME") {
            debug!(name = %name, "Overriding beneficiary name from environment");
            self.beneficiary.name = name;
        }

        if let Some(iban) = lookup("SEPAQR_IBAN") {
            debug!("Overriding IBAN from environment");
            self.beneficiary.iban = iban;
        }

        if let Some(bic) = lookup("SEPAQR_BIC") {
            self.beneficiary.bic = bic;
        }

        if let Some(url) = lookup("SEPAQR_VIEWER_BASE_URL") {
            debug!(url = %url, "Overriding viewer base URL from environment");
            self.share.viewer_base_url = url;
        }

        if let Some(ms) = lookup("SEPAQR_DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.timing.debounce_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring non-numeric SEPAQR_DEBOUNCE_MS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("be", "ieperdives", "sepaqr")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The viewer base as an absolute http(s) URL.
    pub fn viewer_base(&self) -> ConfigResult<Url> {
        let url = Url::parse(&self.share.viewer_base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.share.viewer_base_url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::InvalidUrl(self.share.viewer_base_url.clone())),
        }
    }

    pub fn share_options(&self) -> ShareOptions {
        ShareOptions {
            size: self.share.size,
            error_correction: self.share.error_correction,
            viewer_resource: self.share.viewer_resource.clone(),
        }
    }

    pub fn debouncer(&self) -> Debouncer {
        Debouncer::new(Duration::from_millis(self.timing.debounce_ms))
    }

    pub fn hold_repeater(&self) -> HoldRepeater {
        HoldRepeater::new(
            Duration::from_millis(self.timing.hold_delay_ms),
            Duration::from_millis(self.timing.hold_interval_ms),
        )
    }
}
