//! The audit event resource emitted for every `validate` call.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use assent_contracts::{AccessRequest, OpaqueId};

use crate::{canonical::canonicalize, utc_string, ENGINE_SOURCE};

/// Outcome code for a granted request.
pub const OUTCOME_SUCCESS: &str = "0";
/// Outcome code for a refused request.
pub const OUTCOME_FAILURE: &str = "4";

/// Build the `AuditEvent` resource for one `validate` call.
///
/// The event id is a UUID derived from the request fingerprint, so the same
/// inputs always produce the same event. Emitted for approvals and denials
/// alike; `success` selects the outcome code.
pub fn audit_event(
    request: &AccessRequest,
    success: bool,
    matched_consent_id: Option<&OpaqueId>,
    request_fingerprint: &str,
    recorded: DateTime<Utc>,
) -> Value {
    let event_id = derive_event_id(request_fingerprint);
    debug!(%event_id, success, "building audit event");

    let mut agent = json!({
        "who": request.requester_id.to_string(),
        "organization": request.requester_organization,
        "requestor": true,
    });
    if let Some(address) = &request.network_address {
        agent["network"] = json!(address);
    }

    let mut entity = vec![json!({ "what": format!("Patient/{}", request.patient_id) })];
    if let Some(consent_id) = matched_consent_id {
        entity.push(json!({ "what": format!("Consent/{}", consent_id) }));
    }
    entity.push(json!({ "what": format!("Request/{}", request.request_id) }));

    canonicalize(&json!({
        "resourceType": "AuditEvent",
        "id": event_id.to_string(),
        "type": "rest",
        "subtype": "read",
        "action": "R",
        "recorded": utc_string(recorded),
        "outcome": if success { OUTCOME_SUCCESS } else { OUTCOME_FAILURE },
        "agent": agent,
        "source": { "observer": ENGINE_SOURCE },
        "entity": entity,
    }))
}

/// Derive the deterministic event UUID from the request fingerprint.
fn derive_event_id(request_fingerprint: &str) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(request_fingerprint.as_bytes());
    hasher.update(b"/audit-event");
    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use assent_contracts::{PatientId, Period, Purpose, Role};

    use super::*;

    fn request() -> AccessRequest {
        let period = Period::new(
            chrono::Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            chrono::Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
        )
        .unwrap();
        AccessRequest {
            request_id: OpaqueId::parse("req-1").unwrap(),
            patient_id: PatientId::parse("PAT-5").unwrap(),
            requester_id: OpaqueId::parse("nurse-k").unwrap(),
            requester_organization: "clinic-b".to_string(),
            requester_role: Role::Nurse,
            data_types: vec!["AllergyIntolerance".parse().unwrap()],
            purpose: Purpose::EmergencyTreatment,
            time_range: period,
            emergency_context: true,
            timestamp: period.start,
            network_address: Some("10.2.3.4".to_string()),
            relationship: None,
        }
    }

    #[test]
    fn event_shape_is_fixed() {
        let now = chrono::Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let consent_id = OpaqueId::parse("c-9").unwrap();
        let event = audit_event(&request(), true, Some(&consent_id), "fp", now);

        assert_eq!(event["resourceType"], "AuditEvent");
        assert_eq!(event["type"], "rest");
        assert_eq!(event["subtype"], "read");
        assert_eq!(event["action"], "R");
        assert_eq!(event["outcome"], OUTCOME_SUCCESS);
        assert_eq!(event["recorded"], "2025-03-01T12:00:00Z");
        assert_eq!(event["agent"]["who"], "nurse-k");
        assert_eq!(event["agent"]["network"], "10.2.3.4");
        assert_eq!(event["source"]["observer"], ENGINE_SOURCE);
        assert_eq!(event["entity"][0]["what"], "Patient/PAT-5");
        assert_eq!(event["entity"][1]["what"], "Consent/c-9");
        assert_eq!(event["entity"][2]["what"], "Request/req-1");
    }

    #[test]
    fn failure_outcome_and_missing_consent() {
        let now = chrono::Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let event = audit_event(&request(), false, None, "fp", now);
        assert_eq!(event["outcome"], OUTCOME_FAILURE);
        assert_eq!(event["entity"][1]["what"], "Request/req-1");
    }

    #[test]
    fn event_id_is_deterministic_in_the_fingerprint() {
        let now = chrono::Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let a = audit_event(&request(), true, None, "fp-a", now);
        let b = audit_event(&request(), true, None, "fp-a", now);
        let c = audit_event(&request(), true, None, "fp-b", now);
        assert_eq!(a["id"], b["id"]);
        assert_ne!(a["id"], c["id"]);
    }
}
