//! Decision assembly: request fingerprint, expiry, access handle, and
//! restrictions.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use assent_contracts::{
    AccessHandle, AccessRequest, AssentError, AssentResult, OpaqueId, PermissionSet, Restriction,
};
use assent_interop::{to_canonical_string, utc_string};
use assent_terminology::default_duration;

/// Versioned salt mixed into every derived handle. Bump when the
/// derivation scheme changes.
pub const ENGINE_SALT: &str = "assent/1";

/// SHA-256 hex fingerprint of the canonical request.
pub fn request_fingerprint(request: &AccessRequest) -> AssentResult<String> {
    let value = serde_json::to_value(request).map_err(|e| AssentError::Serialization {
        reason: format!("failed to serialize request for fingerprinting: {}", e),
    })?;
    let canonical = to_canonical_string(&value);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Derive the opaque access handle from `(salt, requestId, consentId,
/// expiry)`. A pure function: identical inputs yield identical handles.
/// The handle is a lookup key, not a credential; it is neither signed nor
/// encrypted.
pub fn derive_access_handle(
    request_id: &OpaqueId,
    consent_id: &OpaqueId,
    expires_at: DateTime<Utc>,
) -> AssentResult<AccessHandle> {
    let mut hasher = Sha256::new();
    hasher.update(ENGINE_SALT.as_bytes());
    hasher.update(b"|");
    hasher.update(request_id.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(consent_id.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(utc_string(expires_at).as_bytes());

    let id = OpaqueId::parse_as("accessHandle", hex::encode(hasher.finalize()))?;
    Ok(AccessHandle { id, expires_at })
}

/// Expiry: the purpose default measured from the request timestamp, capped
/// by the consent period end and, under the override, by the emergency cap
/// measured from `now`.
pub fn compute_expiry(
    request: &AccessRequest,
    consent_end: Option<DateTime<Utc>>,
    emergency_cap: Option<(DateTime<Utc>, i64)>,
) -> DateTime<Utc> {
    let mut expiry = request.timestamp + default_duration(request.purpose);
    if let Some(end) = consent_end {
        expiry = expiry.min(end);
    }
    if let Some((now, hours)) = emergency_cap {
        expiry = expiry.min(now + Duration::hours(hours));
    }
    expiry
}

/// The structured restriction list for an approved decision.
pub fn restrictions_for(set: &PermissionSet, emergency: bool) -> Vec<Restriction> {
    let mut restrictions = Vec::new();
    if !set.masked.is_empty() {
        restrictions.push(Restriction::Mask {
            fields: set.masked.iter().cloned().collect(),
        });
    }
    if !set.pseudonymized.is_empty() {
        restrictions.push(Restriction::Pseudonymize {
            fields: set.pseudonymized.iter().cloned().collect(),
        });
    }
    if emergency {
        restrictions.push(Restriction::EmergencyExpiry24h);
    }
    restrictions
}

#[cfg(test)]
mod tests {
    use assent_contracts::Purpose;

    use crate::testutil::{at, base_request};

    use super::*;

    #[test]
    fn fingerprint_is_stable_and_input_sensitive() {
        let a = request_fingerprint(&base_request()).unwrap();
        let b = request_fingerprint(&base_request()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let mut changed = base_request();
        changed.purpose = Purpose::Research;
        let c = request_fingerprint(&changed).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn handle_is_deterministic_in_all_inputs() {
        let req = OpaqueId::parse("req-1").unwrap();
        let consent = OpaqueId::parse("c-1").unwrap();
        let expiry = at("2025-03-31T12:00:00Z");

        let a = derive_access_handle(&req, &consent, expiry).unwrap();
        let b = derive_access_handle(&req, &consent, expiry).unwrap();
        assert_eq!(a, b);

        let other_consent = OpaqueId::parse("c-2").unwrap();
        let c = derive_access_handle(&req, &other_consent, expiry).unwrap();
        assert_ne!(a.id, c.id);

        let d = derive_access_handle(&req, &consent, at("2025-04-01T12:00:00Z")).unwrap();
        assert_ne!(a.id, d.id);
    }

    #[test]
    fn expiry_takes_the_earliest_bound() {
        let request = base_request();

        // TREAT default: 30 days from the request timestamp.
        let expiry = compute_expiry(&request, Some(at("2025-12-31T00:00:00Z")), None);
        assert_eq!(expiry, at("2025-03-31T12:00:00Z"));

        // Consent ends sooner than the purpose default.
        let expiry = compute_expiry(&request, Some(at("2025-03-10T00:00:00Z")), None);
        assert_eq!(expiry, at("2025-03-10T00:00:00Z"));

        // The emergency cap wins over both.
        let now = at("2025-03-01T12:00:00Z");
        let expiry = compute_expiry(&request, Some(at("2025-12-31T00:00:00Z")), Some((now, 24)));
        assert_eq!(expiry, at("2025-03-02T12:00:00Z"));
    }

    #[test]
    fn restrictions_reflect_the_permission_set() {
        let mut set = PermissionSet::new();
        assert!(restrictions_for(&set, false).is_empty());

        set.masked.insert("patient.telecom".parse().unwrap());
        set.pseudonymized.insert("patient.name".parse().unwrap());
        let restrictions = restrictions_for(&set, true);
        assert_eq!(restrictions.len(), 3);
        assert!(matches!(restrictions[0], Restriction::Mask { .. }));
        assert!(matches!(restrictions[1], Restriction::Pseudonymize { .. }));
        assert!(matches!(restrictions[2], Restriction::EmergencyExpiry24h));
    }
}
