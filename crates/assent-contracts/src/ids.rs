//! Identifier newtypes with syntactic validation.
//!
//! Validation here is purely syntactic. Whether a patient or consent with a
//! given id actually exists is the repository's problem, not the engine's.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AssentError, AssentResult};

/// A patient identifier: the literal prefix `PAT-` followed by 1 to 12
/// decimal digits, e.g. `PAT-004217`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatientId(String);

impl PatientId {
    /// Parse and validate a patient identifier.
    pub fn parse(value: impl Into<String>) -> AssentResult<Self> {
        let value = value.into();
        let digits = value.strip_prefix("PAT-").ok_or_else(|| {
            AssentError::InvalidIdentifier {
                kind: "patientId",
                value: value.clone(),
                detail: "expected prefix 'PAT-'".to_string(),
            }
        })?;
        if digits.is_empty() || digits.len() > 12 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AssentError::InvalidIdentifier {
                kind: "patientId",
                value: value.clone(),
                detail: "expected 1 to 12 decimal digits after the prefix".to_string(),
            });
        }
        Ok(Self(value))
    }

    /// The full identifier string, prefix included.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PatientId {
    type Error = AssentError;
    fn try_from(value: String) -> AssentResult<Self> {
        Self::parse(value)
    }
}

impl From<PatientId> for String {
    fn from(id: PatientId) -> String {
        id.0
    }
}

/// An opaque identifier for requests, consents, and access handles:
/// 1 to 128 characters from the URL-safe set `[A-Za-z0-9._~-]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OpaqueId(String);

impl OpaqueId {
    /// Parse and validate an opaque identifier.
    ///
    /// `kind` names the field being validated and appears in the error.
    pub fn parse_as(kind: &'static str, value: impl Into<String>) -> AssentResult<Self> {
        let value = value.into();
        if value.is_empty() || value.len() > 128 {
            return Err(AssentError::InvalidIdentifier {
                kind,
                value,
                detail: "length must be 1 to 128 characters".to_string(),
            });
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'~' | b'-'))
        {
            return Err(AssentError::InvalidIdentifier {
                kind,
                value,
                detail: "characters must be URL-safe: [A-Za-z0-9._~-]".to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Parse with the generic kind label `"id"`.
    pub fn parse(value: impl Into<String>) -> AssentResult<Self> {
        Self::parse_as("id", value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OpaqueId {
    type Error = AssentError;
    fn try_from(value: String) -> AssentResult<Self> {
        Self::parse(value)
    }
}

impl From<OpaqueId> for String {
    fn from(id: OpaqueId) -> String {
        id.0
    }
}
