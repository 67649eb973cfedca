//! Emergency override: forced access to safety-critical classes under
//! emergency treatment.

use tracing::info;

use assent_contracts::{AccessRequest, DataClass, PermissionSet, Purpose};
use assent_terminology::{safety_critical_classes, TerminologyRegistry};

/// Whether this request may trigger the override at all: emergency
/// treatment purpose and an override-capable role.
pub fn eligible(request: &AccessRequest, registry: &TerminologyRegistry) -> bool {
    request.purpose == Purpose::EmergencyTreatment
        && registry
            .roles
            .capability(request.requester_role)
            .may_override_emergency
}

/// Force-allow the requested safety-critical classes into `set`.
///
/// Returns the classes the override actually added (requested, safety
/// critical, and not already allowed). Classes outside the safety-critical
/// set are never touched.
pub fn force_safety_critical(set: &mut PermissionSet, request: &AccessRequest) -> Vec<DataClass> {
    let mut forced = Vec::new();
    for requested in &request.data_types {
        let critical = safety_critical_classes()
            .iter()
            .any(|c| c.covers(requested).is_hit());
        if critical && !set.allowed.contains(requested) {
            set.allow(requested.clone());
            forced.push(requested.clone());
        }
    }
    if !forced.is_empty() {
        info!(
            requester = %request.requester_id,
            classes = ?forced.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            "emergency override forced safety-critical access"
        );
    }
    forced
}
