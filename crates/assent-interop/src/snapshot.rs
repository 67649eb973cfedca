//! The consent resource snapshot emitted for approved decisions.

use serde_json::{json, Value};

use assent_contracts::{AccessRequest, OpaqueId, Period, PermissionSet};

use crate::{canonical::canonicalize, utc_string, ENGINE_SOURCE};

/// Build the `Consent` resource snapshot for an approved decision.
///
/// The snapshot echoes the request's patient and purpose, the matched
/// consent's effective period, and the final filtered permissions as
/// provision classes. Field names are closed and fixed; the returned value
/// is already canonical.
pub fn consent_snapshot(
    request: &AccessRequest,
    permissions: &PermissionSet,
    consent_period: &Period,
    matched_consent_id: &OpaqueId,
) -> Value {
    let allowed: Vec<String> = permissions.allowed.iter().map(|c| c.to_string()).collect();
    let masked: Vec<String> = permissions.masked.iter().map(|f| f.to_string()).collect();
    let pseudonymized: Vec<String> =
        permissions.pseudonymized.iter().map(|f| f.to_string()).collect();

    let mut provision = json!({
        "type": "permit",
        "purpose": [request.purpose.code()],
        "class": allowed,
        "mask": masked,
        "pseudonymize": pseudonymized,
    });

    // Denied classes surface as a nested deny provision, mirroring the
    // exception structure of the source consent.
    if !permissions.denied.is_empty() {
        let denied: Vec<String> = permissions.denied.iter().map(|c| c.to_string()).collect();
        provision["provision"] = json!([{ "type": "deny", "class": denied }]);
    }

    canonicalize(&json!({
        "resourceType": "Consent",
        "status": "active",
        "patient": { "reference": format!("Patient/{}", request.patient_id) },
        "period": {
            "start": utc_string(consent_period.start),
            "end": utc_string(consent_period.end),
        },
        "provision": provision,
        "provenance": {
            "matchedConsentId": matched_consent_id.to_string(),
            "engine": ENGINE_SOURCE,
        },
    }))
}
