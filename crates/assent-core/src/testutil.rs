//! Shared fixtures for the engine test suites.

use chrono::{DateTime, Utc};

use assent_contracts::{
    AccessRequest, Consent, ConsentStatus, OpaqueId, PatientId, Period, Provision, Purpose, Role,
};
use assent_temporal::{parse_instant, parse_period};

pub(crate) fn at(s: &str) -> DateTime<Utc> {
    parse_instant(s, true).unwrap()
}

pub(crate) fn period(start: &str, end: &str) -> Period {
    parse_period(start, end, true).unwrap()
}

pub(crate) fn permit(classes: &[&str]) -> Provision {
    Provision::permit(classes.iter().map(|c| c.parse().unwrap()).collect())
}

pub(crate) fn deny(classes: &[&str]) -> Provision {
    Provision::deny(classes.iter().map(|c| c.parse().unwrap()).collect())
}

/// A physician requesting demographics and vital signs for routine
/// treatment on 2025-03-01.
pub(crate) fn base_request() -> AccessRequest {
    AccessRequest {
        request_id: OpaqueId::parse("req-0001").unwrap(),
        patient_id: PatientId::parse("PAT-1001").unwrap(),
        requester_id: OpaqueId::parse("dr-stone").unwrap(),
        requester_organization: "general-hospital".to_string(),
        requester_role: Role::Physician,
        data_types: vec![
            "Patient.demographics".parse().unwrap(),
            "Observation.vital-signs".parse().unwrap(),
        ],
        purpose: Purpose::Treatment,
        time_range: period("2025-03-01", "2025-03-02"),
        emergency_context: false,
        timestamp: at("2025-03-01T12:00:00Z"),
        network_address: None,
        relationship: None,
    }
}

/// An active consent for `PAT-1001` over calendar year 2025.
pub(crate) fn active_consent(id: &str, top: Option<Provision>) -> Consent {
    Consent {
        consent_id: OpaqueId::parse(id).unwrap(),
        patient_id: PatientId::parse("PAT-1001").unwrap(),
        status: ConsentStatus::Active,
        data_period: period("2025-01-01", "2025-12-31"),
        top_provision: top,
    }
}
