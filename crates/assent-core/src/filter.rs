//! The filtering pipeline: role, purpose, sensitivity, and patient
//! preference stages, applied in that order over the evaluator's
//! permission set.

use tracing::debug;

use assent_contracts::{
    AccessRequest, DataClass, FieldPath, PatientPreferences, PermissionSet, Purpose, ReasonCode,
};
use assent_terminology::TerminologyRegistry;

/// Resource segments that clinical purposes never release.
const ADMINISTRATIVE_RESOURCES: [&str; 4] = ["Coverage", "Claim", "Account", "ExplanationOfBenefit"];

/// Identifying fields pseudonymized for research use.
fn identifying_fields() -> Vec<FieldPath> {
    fields(&["patient.identifier", "patient.name", "patient.contact", "patient.address"])
}

/// Value-level clinical detail masked for payment use.
fn detailed_clinical_fields() -> Vec<FieldPath> {
    fields(&[
        "observation.value",
        "observation.interpretation",
        "diagnosticreport.conclusion",
        "condition.evidence",
    ])
}

/// Fields hidden by the mask-demographic preference.
fn demographic_fields() -> Vec<FieldPath> {
    fields(&["patient.name", "patient.address", "patient.birthdate", "patient.telecom"])
}

/// Fields hidden by the contact-emergency-only preference.
fn contact_fields() -> Vec<FieldPath> {
    fields(&["patient.telecom", "patient.contact"])
}

fn fields(paths: &[&str]) -> Vec<FieldPath> {
    paths.iter().filter_map(|p| FieldPath::parse(*p).ok()).collect()
}

/// Run all four stages. Returns `Some(reason)` when a stage withdraws the
/// whole grant; `None` when something (possibly reduced) survives.
pub fn apply_filters(
    set: &mut PermissionSet,
    request: &AccessRequest,
    preferences: &PatientPreferences,
    registry: &TerminologyRegistry,
) -> Option<ReasonCode> {
    if let Some(code) = role_filter(set, request, registry) {
        return Some(code);
    }
    if let Some(code) = purpose_filter(set, request, preferences) {
        return Some(code);
    }
    sensitivity_filter(set, request, registry);
    preference_filter(set, request, preferences);

    set.normalize();
    if set.allowed.is_empty() {
        return Some(ReasonCode::EmptyPermissions);
    }
    None
}

/// Stage 1: intersect with the role's base capability. Denies outrank
/// allows; the role's standing pseudonymize fields are applied here.
fn role_filter(
    set: &mut PermissionSet,
    request: &AccessRequest,
    registry: &TerminologyRegistry,
) -> Option<ReasonCode> {
    let cap = registry.roles.capability(request.requester_role);

    for class in set.allowed.clone() {
        if cap.denies(&class) {
            debug!(role = %request.requester_role, %class, "role capability denies class");
            set.deny(class);
        } else if !cap.permits(&class) {
            set.allowed.remove(&class);
        }
    }
    set.pseudonymized.extend(cap.pseudonymize_fields.iter().cloned());

    if set.allowed.is_empty() {
        Some(ReasonCode::RoleDenied)
    } else {
        None
    }
}

/// Stage 2: purpose-specific narrowing.
fn purpose_filter(
    set: &mut PermissionSet,
    request: &AccessRequest,
    preferences: &PatientPreferences,
) -> Option<ReasonCode> {
    match request.purpose {
        Purpose::Treatment | Purpose::EmergencyTreatment => {
            for class in set.allowed.clone() {
                if is_administrative(&class) {
                    set.deny(class);
                }
            }
            if set.allowed.is_empty() {
                return Some(ReasonCode::EmptyPermissions);
            }
        }
        Purpose::Payment => {
            set.masked.extend(detailed_clinical_fields());
        }
        Purpose::Research => {
            if preferences.no_research {
                withdraw_all(set);
                return Some(ReasonCode::PreferenceDenied);
            }
            set.pseudonymized.extend(identifying_fields());
        }
        Purpose::Marketing => {
            if !preferences.allows_marketing() {
                withdraw_all(set);
                return Some(ReasonCode::PreferenceDenied);
            }
        }
        Purpose::Operations | Purpose::PublicHealth | Purpose::Directory => {}
    }
    None
}

/// Stage 3: classes at or above the masking floor pull in the role's mask
/// fields. Also re-run by the emergency path after forcing classes in.
pub(crate) fn sensitivity_filter(
    set: &mut PermissionSet,
    request: &AccessRequest,
    registry: &TerminologyRegistry,
) {
    let cap = registry.roles.capability(request.requester_role);
    let sensitive = set
        .allowed
        .iter()
        .any(|class| registry.sensitivity.requires_masking(class));
    if sensitive {
        set.masked.extend(cap.mask_fields.iter().cloned());
    }
}

/// Stage 4: remaining patient preferences. The marketing and research
/// refusals already acted in the purpose stage.
fn preference_filter(
    set: &mut PermissionSet,
    request: &AccessRequest,
    preferences: &PatientPreferences,
) {
    if preferences.mask_demographic {
        set.masked.extend(demographic_fields());
    }
    if preferences.contact_emergency_only && request.purpose != Purpose::EmergencyTreatment {
        set.masked.extend(contact_fields());
    }
}

fn is_administrative(class: &DataClass) -> bool {
    match class {
        DataClass::Any => false,
        DataClass::Class { resource, .. } => {
            ADMINISTRATIVE_RESOURCES.iter().any(|r| r == resource)
        }
    }
}

fn withdraw_all(set: &mut PermissionSet) {
    for class in set.allowed.clone() {
        set.deny(class);
    }
}
