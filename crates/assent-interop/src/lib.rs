//! # assent-interop
//!
//! Interoperability artifacts of the ASSENT engine: the consent resource
//! snapshot, the audit event, the canonical (recursively key-sorted) JSON
//! writer, and embedded JSON Schemas that pin both shapes.
//!
//! Identical inputs must produce byte-identical output. Everything here is
//! pure; emission order and key order are fully determined by the inputs.

use chrono::{DateTime, SecondsFormat, Utc};

pub mod audit;
pub mod canonical;
pub mod schema;
pub mod snapshot;

pub use audit::{audit_event, OUTCOME_FAILURE, OUTCOME_SUCCESS};
pub use canonical::{canonicalize, to_canonical_string};
pub use schema::{validate_audit_event, validate_consent_snapshot};
pub use snapshot::consent_snapshot;

/// The engine source id stamped into snapshots and audit events.
pub const ENGINE_SOURCE: &str = "assent-engine/0.1";

/// Render a UTC instant as RFC 3339 with a `Z` suffix and whole seconds.
pub fn utc_string(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
