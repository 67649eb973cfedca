//! Closed code systems: roles, purposes, consent status, data classes, and
//! field paths.
//!
//! Every enumeration here is closed. Wire forms match the documented codes
//! exactly (`TREAT`, `entered-in-error`, …); an unknown code is an
//! `AssentError::UnknownEnum`, never a silent default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AssentError, AssentResult};

// ── Requester roles ───────────────────────────────────────────────────────────

/// The role under which a requester acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Physician,
    Nurse,
    Pharmacist,
    Researcher,
    Billing,
    Other,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Physician,
        Role::Nurse,
        Role::Pharmacist,
        Role::Researcher,
        Role::Billing,
        Role::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Physician => "physician",
            Role::Nurse => "nurse",
            Role::Pharmacist => "pharmacist",
            Role::Researcher => "researcher",
            Role::Billing => "billing",
            Role::Other => "other",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AssentError;

    fn from_str(s: &str) -> AssentResult<Self> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AssentError::UnknownEnum {
                kind: "role",
                value: s.to_string(),
            })
    }
}

// ── Purpose of use ────────────────────────────────────────────────────────────

/// The purpose-of-use code attached to a request or provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Purpose {
    /// Routine treatment.
    #[serde(rename = "TREAT")]
    Treatment,
    /// Emergency treatment.
    #[serde(rename = "ETREAT")]
    EmergencyTreatment,
    /// Healthcare payment.
    #[serde(rename = "HPAYMT")]
    Payment,
    /// Healthcare operations.
    #[serde(rename = "HOPERAT")]
    Operations,
    /// Healthcare research.
    #[serde(rename = "HRESCH")]
    Research,
    /// Public health.
    #[serde(rename = "PUBHLTH")]
    PublicHealth,
    /// Healthcare marketing.
    #[serde(rename = "HMARKT")]
    Marketing,
    /// Patient directory.
    #[serde(rename = "HDIRECT")]
    Directory,
}

impl Purpose {
    pub const ALL: [Purpose; 8] = [
        Purpose::Treatment,
        Purpose::EmergencyTreatment,
        Purpose::Payment,
        Purpose::Operations,
        Purpose::Research,
        Purpose::PublicHealth,
        Purpose::Marketing,
        Purpose::Directory,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Purpose::Treatment => "TREAT",
            Purpose::EmergencyTreatment => "ETREAT",
            Purpose::Payment => "HPAYMT",
            Purpose::Operations => "HOPERAT",
            Purpose::Research => "HRESCH",
            Purpose::PublicHealth => "PUBHLTH",
            Purpose::Marketing => "HMARKT",
            Purpose::Directory => "HDIRECT",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Purpose {
    type Err = AssentError;

    fn from_str(s: &str) -> AssentResult<Self> {
        Purpose::ALL
            .iter()
            .copied()
            .find(|p| p.code() == s)
            .ok_or_else(|| AssentError::UnknownEnum {
                kind: "purpose",
                value: s.to_string(),
            })
    }
}

// ── Consent lifecycle status ──────────────────────────────────────────────────

/// The lifecycle status of a consent. Only `Active` consents are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsentStatus {
    Draft,
    Proposed,
    Active,
    Rejected,
    Inactive,
    EnteredInError,
}

// ── Organizational relationship ───────────────────────────────────────────────

/// Pre-materialized relationship between the requester's organization and
/// the consent's custodian. Supplied by the caller; the engine never infers
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    NetworkPartner,
    ActiveReferral,
    Unknown,
}

impl Relationship {
    /// The requester-axis score contributed when no actor constraint matches
    /// explicitly.
    pub fn score(&self) -> f64 {
        match self {
            Relationship::NetworkPartner => 0.8,
            Relationship::ActiveReferral => 0.6,
            Relationship::Unknown => 0.2,
        }
    }
}

// ── Data classes ──────────────────────────────────────────────────────────────

/// How closely a consented class covers a requested class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CoverageDepth {
    Miss,
    Wildcard,
    Parent,
    Exact,
}

impl CoverageDepth {
    /// The data-type axis contribution for this depth.
    pub fn score(&self) -> f64 {
        match self {
            CoverageDepth::Exact => 1.0,
            CoverageDepth::Parent => 0.7,
            CoverageDepth::Wildcard => 0.5,
            CoverageDepth::Miss => 0.0,
        }
    }

    /// True when this depth covers the requested class at all.
    pub fn is_hit(&self) -> bool {
        !matches!(self, CoverageDepth::Miss)
    }
}

/// A coded clinical data class: a resource segment optionally narrowed by a
/// sub-segment, or the global wildcard.
///
/// The grammar is bounded at two segments. `Observation.laboratory` names a
/// concrete class, `Observation` (equivalently `Observation.*`) names the
/// parent class covering all its sub-classes, and `*` covers everything.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataClass {
    /// The global wildcard `*`.
    Any,
    /// A resource class, optionally narrowed to a sub-class.
    Class {
        resource: String,
        segment: Option<String>,
    },
}

impl DataClass {
    /// A concrete two-segment class, e.g. `DataClass::of("Observation", "genetic")`.
    pub fn of(resource: &str, segment: &str) -> Self {
        DataClass::Class {
            resource: resource.to_string(),
            segment: Some(segment.to_string()),
        }
    }

    /// A bare resource class covering all its sub-classes.
    pub fn resource(resource: &str) -> Self {
        DataClass::Class {
            resource: resource.to_string(),
            segment: None,
        }
    }

    /// How deeply `self` (a consented or capability class) covers the
    /// requested class.
    pub fn covers(&self, requested: &DataClass) -> CoverageDepth {
        match (self, requested) {
            (DataClass::Any, _) => CoverageDepth::Wildcard,
            (DataClass::Class { .. }, DataClass::Any) => CoverageDepth::Miss,
            (
                DataClass::Class { resource: a, segment: sa },
                DataClass::Class { resource: b, segment: sb },
            ) => {
                if a != b {
                    CoverageDepth::Miss
                } else {
                    match (sa, sb) {
                        (None, None) => CoverageDepth::Exact,
                        (Some(x), Some(y)) if x == y => CoverageDepth::Exact,
                        // A parent class covers any narrower sub-class.
                        (None, Some(_)) => CoverageDepth::Parent,
                        _ => CoverageDepth::Miss,
                    }
                }
            }
        }
    }

    fn valid_resource(s: &str) -> bool {
        !s.is_empty()
            && s.len() <= 64
            && s.starts_with(|c: char| c.is_ascii_uppercase())
            && s.chars().all(|c| c.is_ascii_alphanumeric())
    }

    fn valid_segment(s: &str) -> bool {
        !s.is_empty()
            && s.len() <= 64
            && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl fmt::Display for DataClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataClass::Any => f.write_str("*"),
            DataClass::Class { resource, segment: None } => f.write_str(resource),
            DataClass::Class { resource, segment: Some(s) } => write!(f, "{}.{}", resource, s),
        }
    }
}

impl FromStr for DataClass {
    type Err = AssentError;

    fn from_str(s: &str) -> AssentResult<Self> {
        if s == "*" {
            return Ok(DataClass::Any);
        }
        // `Resource.*` normalizes to the bare parent class.
        let s = s.strip_suffix(".*").unwrap_or(s);
        let err = || AssentError::UnknownEnum {
            kind: "dataType",
            value: s.to_string(),
        };
        match s.split_once('.') {
            None => {
                if Self::valid_resource(s) {
                    Ok(DataClass::resource(s))
                } else {
                    Err(err())
                }
            }
            Some((resource, segment)) => {
                if Self::valid_resource(resource) && Self::valid_segment(segment) {
                    Ok(DataClass::of(resource, segment))
                } else {
                    Err(err())
                }
            }
        }
    }
}

impl TryFrom<String> for DataClass {
    type Error = AssentError;
    fn try_from(value: String) -> AssentResult<Self> {
        value.parse()
    }
}

impl From<DataClass> for String {
    fn from(c: DataClass) -> String {
        c.to_string()
    }
}

// ── Field paths ───────────────────────────────────────────────────────────────

/// A dot-separated field token used by mask and pseudonymize collections,
/// e.g. `patient.identifier`. Segments are lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(String);

impl FieldPath {
    /// Parse and validate a field path.
    pub fn parse(value: impl Into<String>) -> AssentResult<Self> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.len() <= 128
            && value.split('.').all(|seg| {
                !seg.is_empty()
                    && seg
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            });
        if valid {
            Ok(Self(value))
        } else {
            Err(AssentError::UnknownEnum {
                kind: "fieldPath",
                value,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FieldPath {
    type Err = AssentError;
    fn from_str(s: &str) -> AssentResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = AssentError;
    fn try_from(value: String) -> AssentResult<Self> {
        Self::parse(value)
    }
}

impl From<FieldPath> for String {
    fn from(p: FieldPath) -> String {
        p.0
    }
}
