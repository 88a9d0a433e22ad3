//! # Beneficiary Commands
//!
//! The payee block of the payment form. Edits are never rejected; a
//! malformed IBAN is logged and still written to the payload as typed.

use serde::Serialize;
use tracing::{debug, warn};

use sepaqr_core::validation::validate_iban_format;

use crate::state::{Beneficiary, SessionState};

/// Beneficiary as shown in the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryResponse {
    pub beneficiary: Beneficiary,
    /// `false` when the IBAN does not look like one.
    pub iban_looks_valid: bool,
}

impl From<&Beneficiary> for BeneficiaryResponse {
    fn from(beneficiary: &Beneficiary) -> Self {
        BeneficiaryResponse {
            iban_looks_valid: validate_iban_format(&beneficiary.iban).is_ok(),
            beneficiary: beneficiary.clone(),
        }
    }
}

pub fn get_beneficiary(state: &SessionState) -> BeneficiaryResponse {
    state.with_session(|s| BeneficiaryResponse::from(&s.beneficiary))
}

/// Replaces the beneficiary for the rest of the session.
pub fn set_beneficiary(state: &SessionState, name: &str, iban: &str, bic: &str) -> BeneficiaryResponse {
    let beneficiary = Beneficiary {
        name: name.trim().to_string(),
        iban: iban.trim().to_string(),
        bic: bic.trim().to_string(),
    };

    if let Err(e) = validate_iban_format(&beneficiary.iban) {
        warn!(error = %e, "Beneficiary IBAN looks malformed");
    }
    debug!(name = %beneficiary.name, "set_beneficiary command");

    state.with_session_mut(|s| {
        s.beneficiary = beneficiary;
        BeneficiaryResponse::from(&s.beneficiary)
    })
}
