//! Fixture data for the demo scenarios.
//!
//! All identifiers and clinical situations are fictional. Each fixture
//! returns everything one `validate` call needs, with a fixed `now` so the
//! output is reproducible run to run.

use chrono::{DateTime, Utc};

use assent_contracts::{
    AccessRequest, ActorConstraint, Consent, ConsentStatus, OpaqueId, PatientId,
    PatientPreferences, Period, Provision, Purpose, Role,
};
use assent_temporal::{parse_instant, parse_period};

/// One runnable demo scenario.
pub struct Scenario {
    pub title: &'static str,
    pub expectation: &'static str,
    pub request: AccessRequest,
    pub consents: Vec<Consent>,
    pub now: DateTime<Utc>,
    pub preferences: PatientPreferences,
}

fn at(s: &str) -> DateTime<Utc> {
    parse_instant(s, true).expect("fixture timestamp")
}

fn period(start: &str, end: &str) -> Period {
    parse_period(start, end, true).expect("fixture period")
}

fn classes(codes: &[&str]) -> Vec<assent_contracts::DataClass> {
    codes.iter().map(|c| c.parse().expect("fixture class")).collect()
}

fn request(
    id: &str,
    role: Role,
    purpose: Purpose,
    data_types: &[&str],
    range: Period,
    timestamp: &str,
) -> AccessRequest {
    AccessRequest {
        request_id: OpaqueId::parse(id).expect("fixture request id"),
        patient_id: PatientId::parse("PAT-1001").expect("fixture patient id"),
        requester_id: OpaqueId::parse("clinician-7").expect("fixture requester id"),
        requester_organization: "general-hospital".to_string(),
        requester_role: role,
        data_types: classes(data_types),
        purpose,
        time_range: range,
        emergency_context: purpose == Purpose::EmergencyTreatment,
        timestamp: at(timestamp),
        network_address: Some("192.0.2.10".to_string()),
        relationship: None,
    }
}

fn consent(id: &str, range: Period, top: Provision) -> Consent {
    Consent {
        consent_id: OpaqueId::parse(id).expect("fixture consent id"),
        patient_id: PatientId::parse("PAT-1001").expect("fixture patient id"),
        status: ConsentStatus::Active,
        data_period: range,
        top_provision: Some(top),
    }
}

/// Physician treatment access with an exact consent match.
pub fn physician_treatment() -> Scenario {
    let mut top = Provision::permit(classes(&["Patient.demographics", "Observation.vital-signs"]));
    top.purposes = vec![Purpose::Treatment];
    top.actors = vec![ActorConstraint::role(Role::Physician)];

    Scenario {
        title: "Physician treatment access, exact match",
        expectation: "approved, no masking, expiry 30 days out",
        request: request(
            "req-treat-01",
            Role::Physician,
            Purpose::Treatment,
            &["Patient.demographics", "Observation.vital-signs"],
            period("2025-03-01", "2025-03-02"),
            "2025-03-01T12:00:00Z",
        ),
        consents: vec![consent("consent-2025-a", period("2025-01-01", "2025-12-31"), top)],
        now: at("2025-03-01T12:00:00Z"),
        preferences: PatientPreferences::default(),
    }
}

/// A nested deny carves genetic data out of a broad observation permit.
pub fn nested_genetic_deny() -> Scenario {
    let mut top = Provision::permit(classes(&["Patient.demographics", "Observation"]));
    top.purposes = vec![Purpose::Treatment];
    top.actors = vec![ActorConstraint::role(Role::Physician)];
    top.nested
        .push(Provision::deny(classes(&["Observation.genetic"])));

    Scenario {
        title: "Nested deny for genetic data",
        expectation: "denied, partial coverage",
        request: request(
            "req-treat-02",
            Role::Physician,
            Purpose::Treatment,
            &["Patient.demographics", "Observation.vital-signs", "Observation.genetic"],
            period("2025-03-01", "2025-03-02"),
            "2025-03-01T12:00:00Z",
        ),
        consents: vec![consent("consent-2025-a", period("2025-01-01", "2025-12-31"), top)],
        now: at("2025-03-01T12:00:00Z"),
        preferences: PatientPreferences::default(),
    }
}

/// Research access with identifying fields pseudonymized.
pub fn researcher_pseudonymization() -> Scenario {
    let mut top = Provision::permit(classes(&["Patient.demographics", "Condition.diagnosis"]));
    top.purposes = vec![Purpose::Research];
    top.actors = vec![ActorConstraint::role(Role::Researcher)];

    Scenario {
        title: "Researcher pseudonymization",
        expectation: "approved, identifying fields pseudonymized",
        request: request(
            "req-resch-01",
            Role::Researcher,
            Purpose::Research,
            &["Patient.demographics", "Condition.diagnosis"],
            period("2025-03-01", "2025-03-02"),
            "2025-03-01T12:00:00Z",
        ),
        consents: vec![consent("consent-resch", period("2025-01-01", "2030-01-01"), top)],
        now: at("2025-03-01T12:00:00Z"),
        preferences: PatientPreferences::default(),
    }
}

fn emergency_fixture(role: Role) -> (AccessRequest, Vec<Consent>, DateTime<Utc>) {
    // The consent covers observations for physicians; it never permits
    // allergy data, so only the override can grant it.
    let mut top = Provision::permit(classes(&["Observation"]));
    top.purposes = vec![Purpose::Treatment];
    top.actors = vec![ActorConstraint::role(Role::Physician)];

    let req = request(
        "req-emerg-01",
        role,
        Purpose::EmergencyTreatment,
        &["AllergyIntolerance"],
        period("2025-03-01T12:00:00Z", "2025-03-01T13:00:00Z"),
        "2025-03-01T12:00:00Z",
    );
    let consents = vec![consent("consent-2025-a", period("2025-01-01", "2025-12-31"), top)];
    (req, consents, at("2025-03-01T12:00:00Z"))
}

/// Emergency override: a nurse reads allergies with no matching permit.
pub fn nurse_emergency_override() -> Scenario {
    let (request, consents, now) = emergency_fixture(Role::Nurse);
    Scenario {
        title: "Emergency override for nurse",
        expectation: "approved via override, expiry capped at 24 hours",
        request,
        consents,
        now,
        preferences: PatientPreferences::default(),
    }
}

/// The same emergency, requested by a role without override capability.
pub fn researcher_emergency_refused() -> Scenario {
    let (request, consents, now) = emergency_fixture(Role::Researcher);
    Scenario {
        title: "Researcher cannot emergency-override",
        expectation: "denied, no matching consent",
        request,
        consents,
        now,
        preferences: PatientPreferences::default(),
    }
}

/// The requested window straddles the consent period end.
pub fn temporal_violation() -> Scenario {
    let mut top = Provision::permit(classes(&["Patient.demographics", "Observation.vital-signs"]));
    top.purposes = vec![Purpose::Treatment];
    top.actors = vec![ActorConstraint::role(Role::Physician)];

    Scenario {
        title: "Temporal window violation",
        expectation: "denied, temporal out of scope",
        request: request(
            "req-treat-03",
            Role::Physician,
            Purpose::Treatment,
            &["Patient.demographics", "Observation.vital-signs"],
            period("2025-06-29", "2025-07-05"),
            "2025-06-29T12:00:00Z",
        ),
        consents: vec![consent("consent-h1", period("2025-01-01", "2025-06-30"), top)],
        now: at("2025-06-29T12:00:00Z"),
        preferences: PatientPreferences::default(),
    }
}

/// All six scenarios, in presentation order.
pub fn all() -> Vec<Scenario> {
    vec![
        physician_treatment(),
        nested_genetic_deny(),
        researcher_pseudonymization(),
        nurse_emergency_override(),
        researcher_emergency_refused(),
        temporal_violation(),
    ]
}
