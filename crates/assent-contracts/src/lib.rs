//! # assent-contracts
//!
//! Shared types and error definitions for the ASSENT consent decision
//! engine.
//!
//! All crates in the workspace import from here. No decision logic lives in
//! this crate, only data definitions, their invariants, and error types.

pub mod consent;
pub mod decision;
pub mod error;
pub mod ids;
pub mod period;
pub mod permission;
pub mod preferences;
pub mod request;
pub mod terms;

pub use consent::{ActorConstraint, Consent, Provision, ProvisionKind};
pub use decision::{
    AccessHandle, AuditInfo, Decision, DecisionBundle, DecisionKind, Reason, ReasonCode,
    Restriction, ScoreBreakdown,
};
pub use error::{AssentError, AssentResult};
pub use ids::{OpaqueId, PatientId};
pub use period::Period;
pub use permission::PermissionSet;
pub use preferences::PatientPreferences;
pub use request::AccessRequest;
pub use terms::{ConsentStatus, CoverageDepth, DataClass, FieldPath, Purpose, Relationship, Role};
