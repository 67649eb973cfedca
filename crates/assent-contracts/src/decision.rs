//! Decision, reason codes, score breakdown, access handle, and the bundle
//! returned by `validate`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ids::OpaqueId,
    permission::PermissionSet,
    terms::FieldPath,
};

/// Terminal decision kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Approved,
    Denied,
    /// A match exists but its score falls below the reuse threshold and the
    /// engine was configured to request explicit reconsent. Hosts without a
    /// reconsent flow treat this as `Denied`.
    Pending,
}

impl DecisionKind {
    /// True when the decision grants usable access right now.
    pub fn is_usable(&self) -> bool {
        matches!(self, DecisionKind::Approved)
    }
}

/// The closed set of machine-readable reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Matched,
    NoMatchingConsent,
    PartialCoverage,
    EmptyPermissions,
    TemporalOutOfScope,
    RoleDenied,
    PreferenceDenied,
    MalformedConsent,
    ReconsentRequired,
    EmergencyAccess,
}

impl ReasonCode {
    /// The default human companion string for this code.
    pub fn human_message(&self) -> &'static str {
        match self {
            ReasonCode::Matched => "an active consent matched the request",
            ReasonCode::NoMatchingConsent => "no active consent matched the request",
            ReasonCode::PartialCoverage => "the consent does not cover every requested data type",
            ReasonCode::EmptyPermissions => "the consent yields no permitted data types",
            ReasonCode::TemporalOutOfScope => {
                "the requested time range falls outside the consent period"
            }
            ReasonCode::RoleDenied => "the requester role is not permitted to read this data",
            ReasonCode::PreferenceDenied => "a patient preference withdraws this access",
            ReasonCode::MalformedConsent => "every candidate consent was structurally invalid",
            ReasonCode::ReconsentRequired => {
                "the match requires explicit reconsent before access is granted"
            }
            ReasonCode::EmergencyAccess => "emergency override granted safety-critical access",
        }
    }
}

/// Structured reason: a stable code plus its human companion string.
///
/// Test suites match on `code`; `human` is for people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub code: ReasonCode,
    pub human: String,
}

impl Reason {
    pub fn from_code(code: ReasonCode) -> Self {
        Self {
            code,
            human: code.human_message().to_string(),
        }
    }
}

/// A structured condition attached to an approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum Restriction {
    /// The listed fields must be masked before display.
    Mask { fields: Vec<FieldPath> },
    /// The listed fields must be pseudonymized before release.
    Pseudonymize { fields: Vec<FieldPath> },
    /// The access handle expiry was capped by the emergency override.
    #[serde(rename = "emergency-expiry-24h")]
    EmergencyExpiry24h,
}

/// The per-axis score for one candidate consent.
///
/// Axis values are in [0, 1]; `total` is the weighted sum using the
/// documented weights, also exposed here so audit consumers can recompute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub data_type: f64,
    pub purpose: f64,
    pub requester: f64,
    pub temporal: f64,
    pub total: f64,
}

impl ScoreBreakdown {
    pub const WEIGHT_DATA_TYPE: f64 = 0.4;
    pub const WEIGHT_PURPOSE: f64 = 0.3;
    pub const WEIGHT_REQUESTER: f64 = 0.2;
    pub const WEIGHT_TEMPORAL: f64 = 0.1;

    /// Combine axis scores into a breakdown with the weighted total.
    pub fn weighted(data_type: f64, purpose: f64, requester: f64, temporal: f64) -> Self {
        let total = data_type * Self::WEIGHT_DATA_TYPE
            + purpose * Self::WEIGHT_PURPOSE
            + requester * Self::WEIGHT_REQUESTER
            + temporal * Self::WEIGHT_TEMPORAL;
        Self {
            data_type,
            purpose,
            requester,
            temporal,
            total,
        }
    }
}

/// Opaque access handle: a lookup key for downstream stores, not a
/// credential. Derived deterministically; carries no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessHandle {
    pub id: OpaqueId,
    pub expires_at: DateTime<Utc>,
}

/// The audit-relevant facts of one `validate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditInfo {
    /// SHA-256 hex fingerprint of the canonical request.
    pub request_fingerprint: String,
    /// The consent the decision is based on, when one was selected (or, for
    /// an emergency override without a clearing match, the best candidate).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_consent_id: Option<OpaqueId>,
    /// Score breakdown of the matched consent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
    /// Total score per candidate consent id, for all eligible candidates.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub candidate_scores: BTreeMap<String, f64>,
    /// True when the emergency override forced any class into the grant.
    pub emergency_override: bool,
}

/// The final decision for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub kind: DecisionKind,
    pub reason: Reason,
    /// Present only on approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
    /// Present only on approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_handle: Option<AccessHandle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,
    pub audit_info: AuditInfo,
}

impl Decision {
    /// True when the decision grants usable access right now.
    pub fn is_usable(&self) -> bool {
        self.kind.is_usable()
    }
}

/// Everything one `validate` call produces.
///
/// The consent snapshot is emitted only for approvals; the audit event is
/// emitted for every call. Both are canonical (recursively key-sorted) JSON
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionBundle {
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_snapshot: Option<serde_json::Value>,
    pub audit_event: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_serialize_snake_case() {
        let json = serde_json::to_string(&ReasonCode::NoMatchingConsent).unwrap();
        assert_eq!(json, "\"no_matching_consent\"");
        let json = serde_json::to_string(&ReasonCode::TemporalOutOfScope).unwrap();
        assert_eq!(json, "\"temporal_out_of_scope\"");
    }

    #[test]
    fn weighted_total_uses_documented_weights() {
        let s = ScoreBreakdown::weighted(1.0, 1.0, 1.0, 1.0);
        assert!((s.total - 1.0).abs() < 1e-12);

        let s = ScoreBreakdown::weighted(0.5, 1.0, 0.2, 0.0);
        let expected = 0.5 * 0.4 + 1.0 * 0.3 + 0.2 * 0.2;
        assert!((s.total - expected).abs() < 1e-12);
    }

    #[test]
    fn restriction_wire_form_is_tagged_by_code() {
        let r = Restriction::Mask {
            fields: vec![FieldPath::parse("patient.telecom").unwrap()],
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["code"], "mask");
        assert_eq!(v["fields"][0], "patient.telecom");

        let v = serde_json::to_value(&Restriction::EmergencyExpiry24h).unwrap();
        assert_eq!(v["code"], "emergency-expiry-24h");
    }

    #[test]
    fn pending_is_not_usable() {
        assert!(DecisionKind::Approved.is_usable());
        assert!(!DecisionKind::Denied.is_usable());
        assert!(!DecisionKind::Pending.is_usable());
    }
}
