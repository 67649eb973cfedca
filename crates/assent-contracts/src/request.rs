//! The access request value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AssentError, AssentResult},
    ids::{OpaqueId, PatientId},
    period::Period,
    terms::{DataClass, Purpose, Relationship, Role},
};

/// A single request to access patient clinical data.
///
/// The engine borrows the request for the duration of one `validate` call
/// and never stores it. Invariants are enforced by [`AccessRequest::validate`],
/// which the engine runs before anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub request_id: OpaqueId,
    pub patient_id: PatientId,
    pub requester_id: OpaqueId,
    pub requester_organization: String,
    pub requester_role: Role,
    /// Requested data classes, in request order. Deduplicated, non-empty.
    pub data_types: Vec<DataClass>,
    pub purpose: Purpose,
    /// The window of data the requester wants to read.
    pub time_range: Period,
    /// Set by the caller when the request originates from an emergency
    /// encounter context.
    pub emergency_context: bool,
    /// When the request was made (UTC).
    pub timestamp: DateTime<Utc>,
    /// Network address of the requesting system, echoed into the audit
    /// event's agent block when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_address: Option<String>,
    /// Pre-materialized organizational relationship between requester and
    /// custodian. The engine accepts it as input and never infers it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
}

impl AccessRequest {
    /// Check the request invariants: non-empty, duplicate-free `data_types`
    /// and a well-ordered time range.
    ///
    /// Identifier formats are enforced at construction time by the newtype
    /// parsers, so they are not re-checked here.
    pub fn validate(&self) -> AssentResult<()> {
        if self.data_types.is_empty() {
            return Err(AssentError::EmptyDataTypes {
                request_id: self.request_id.to_string(),
            });
        }
        for (i, dt) in self.data_types.iter().enumerate() {
            if self.data_types[..i].contains(dt) {
                return Err(AssentError::DuplicateDataType {
                    request_id: self.request_id.to_string(),
                    value: dt.to_string(),
                });
            }
        }
        if self.time_range.start > self.time_range.end {
            return Err(AssentError::InvalidTimeRange {
                start: self.time_range.start.to_rfc3339(),
                end: self.time_range.end.to_rfc3339(),
            });
        }
        Ok(())
    }
}
