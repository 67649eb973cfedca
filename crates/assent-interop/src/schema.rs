//! Embedded JSON Schemas for the two emitted resources.
//!
//! The shapes are closed: additional properties are rejected so an
//! accidental field rename or addition fails loudly in tests.

use serde_json::{json, Value};
use tracing::warn;

use assent_contracts::{AssentError, AssentResult};

/// JSON Schema for the consent snapshot resource.
pub fn consent_snapshot_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["resourceType", "status", "patient", "period", "provision", "provenance"],
        "properties": {
            "resourceType": { "const": "Consent" },
            "status": { "const": "active" },
            "patient": {
                "type": "object",
                "additionalProperties": false,
                "required": ["reference"],
                "properties": { "reference": { "type": "string", "pattern": "^Patient/PAT-[0-9]+$" } }
            },
            "period": {
                "type": "object",
                "additionalProperties": false,
                "required": ["start", "end"],
                "properties": {
                    "start": { "type": "string" },
                    "end": { "type": "string" }
                }
            },
            "provision": { "$ref": "#/$defs/provision" },
            "provenance": {
                "type": "object",
                "additionalProperties": false,
                "required": ["matchedConsentId", "engine"],
                "properties": {
                    "matchedConsentId": { "type": "string" },
                    "engine": { "type": "string" }
                }
            }
        },
        "$defs": {
            "provision": {
                "type": "object",
                "additionalProperties": false,
                "required": ["type", "class"],
                "properties": {
                    "type": { "enum": ["permit", "deny"] },
                    "purpose": { "type": "array", "items": { "type": "string" } },
                    "class": { "type": "array", "items": { "type": "string" } },
                    "mask": { "type": "array", "items": { "type": "string" } },
                    "pseudonymize": { "type": "array", "items": { "type": "string" } },
                    "provision": { "type": "array", "items": { "$ref": "#/$defs/provision" } }
                }
            }
        }
    })
}

/// JSON Schema for the audit event resource.
pub fn audit_event_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["resourceType", "id", "type", "subtype", "action", "recorded", "outcome", "agent", "source", "entity"],
        "properties": {
            "resourceType": { "const": "AuditEvent" },
            "id": { "type": "string", "format": "uuid" },
            "type": { "const": "rest" },
            "subtype": { "const": "read" },
            "action": { "const": "R" },
            "recorded": { "type": "string" },
            "outcome": { "enum": ["0", "4"] },
            "agent": {
                "type": "object",
                "additionalProperties": false,
                "required": ["who", "organization", "requestor"],
                "properties": {
                    "who": { "type": "string" },
                    "organization": { "type": "string" },
                    "requestor": { "const": true },
                    "network": { "type": "string" }
                }
            },
            "source": {
                "type": "object",
                "additionalProperties": false,
                "required": ["observer"],
                "properties": { "observer": { "type": "string" } }
            },
            "entity": {
                "type": "array",
                "minItems": 2,
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["what"],
                    "properties": { "what": { "type": "string" } }
                }
            }
        }
    })
}

/// Validate an emitted consent snapshot against the embedded schema.
pub fn validate_consent_snapshot(snapshot: &Value) -> AssentResult<()> {
    validate(snapshot, &consent_snapshot_schema(), "consent snapshot")
}

/// Validate an emitted audit event against the embedded schema.
pub fn validate_audit_event(event: &Value) -> AssentResult<()> {
    validate(event, &audit_event_schema(), "audit event")
}

fn validate(instance: &Value, schema: &Value, what: &str) -> AssentResult<()> {
    let validator = jsonschema::validator_for(schema).map_err(|e| AssentError::Serialization {
        reason: format!("invalid embedded {} schema: {}", what, e),
    })?;

    let mut violations = Vec::new();
    for error in validator.iter_errors(instance) {
        warn!(%what, instance_path = %error.instance_path, "schema violation");
        violations.push(format!("{} at {}", error, error.instance_path));
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(AssentError::Serialization {
            reason: format!("{} failed schema validation: {}", what, violations.join("; ")),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn schemas_themselves_compile() {
        assert!(jsonschema::validator_for(&consent_snapshot_schema()).is_ok());
        assert!(jsonschema::validator_for(&audit_event_schema()).is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut event = json!({
            "resourceType": "AuditEvent",
            "id": "00000000-0000-0000-0000-000000000000",
            "type": "rest",
            "subtype": "read",
            "action": "R",
            "recorded": "2025-03-01T12:00:00Z",
            "outcome": "0",
            "agent": { "who": "a", "organization": "b", "requestor": true },
            "source": { "observer": "assent-engine/0.1" },
            "entity": [ { "what": "Patient/PAT-1" }, { "what": "Request/r-1" } ],
        });
        assert!(validate_audit_event(&event).is_ok());

        event["surprise"] = json!(1);
        assert!(validate_audit_event(&event).is_err());
    }

    #[test]
    fn bad_outcome_code_is_rejected() {
        let event = json!({
            "resourceType": "AuditEvent",
            "id": "00000000-0000-0000-0000-000000000000",
            "type": "rest",
            "subtype": "read",
            "action": "R",
            "recorded": "2025-03-01T12:00:00Z",
            "outcome": "8",
            "agent": { "who": "a", "organization": "b", "requestor": true },
            "source": { "observer": "assent-engine/0.1" },
            "entity": [ { "what": "Patient/PAT-1" }, { "what": "Request/r-1" } ],
        });
        assert!(validate_audit_event(&event).is_err());
    }
}
