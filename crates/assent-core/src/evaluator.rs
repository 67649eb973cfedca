//! Provision evaluation: walking the matched consent tree into a
//! permission set.
//!
//! The walk is depth-first, left to right as listed. Deny takes precedence
//! absolutely: a deny reachable anywhere in the walk is final for its
//! classes, regardless of listing order or nesting level, so a permit never
//! re-adds a class another branch denied. The final set satisfies
//! `allowed ∩ denied = ∅`.

use tracing::debug;

use assent_contracts::{
    AccessRequest, Consent, DataClass, Period, PermissionSet, Provision, ProvisionKind,
};
use assent_terminology::compatibility;

/// Evaluate the matched consent against the request.
///
/// Returns the accumulated permission set; empty when the tree is empty or
/// nothing applies. Coverage checks against the requested classes are the
/// caller's concern.
pub fn evaluate(consent: &Consent, request: &AccessRequest) -> PermissionSet {
    let mut set = PermissionSet::new();
    if let Some(root) = &consent.top_provision {
        apply(root, request, &consent.data_period, &mut set);
    }
    // A deny listed after a permit still wins: subtract at the end.
    set.normalize();
    debug!(
        allowed = set.allowed.len(),
        denied = set.denied.len(),
        "provision walk complete"
    );
    set
}

/// Apply one provision, then its children. The permission set is threaded
/// through the entire walk so a denial established in any earlier branch
/// blocks later permits for the same class.
fn apply(
    provision: &Provision,
    request: &AccessRequest,
    effective: &Period,
    set: &mut PermissionSet,
) {
    let own_period = provision.data_period.unwrap_or(*effective);
    if !applies(provision, request, &own_period) {
        return;
    }

    let covered: Vec<DataClass> = request
        .data_types
        .iter()
        .filter(|dt| provision.classes.iter().any(|c| c.covers(dt).is_hit()))
        .cloned()
        .collect();

    match provision.kind {
        ProvisionKind::Deny => {
            for class in covered {
                set.allowed.remove(&class);
                set.denied.insert(class);
            }
        }
        ProvisionKind::Permit => {
            for class in covered {
                if !set.denied.contains(&class) {
                    set.allowed.insert(class);
                }
            }
        }
    }

    for child in &provision.nested {
        apply(child, request, &own_period, set);
    }
}

/// Whether a provision speaks to this request at all.
///
/// Purposes: empty applies to any; otherwise exact or documented-compatible
/// (treatment ↔ emergency treatment). Actors: empty applies to any.
/// Period: a provision whose period does not overlap the requested window
/// is skipped, subtree included.
fn applies(provision: &Provision, request: &AccessRequest, own_period: &Period) -> bool {
    let purpose_ok = provision.purposes.is_empty()
        || provision
            .purposes
            .iter()
            .any(|p| compatibility(request.purpose, *p) > 0.0);
    if !purpose_ok {
        return false;
    }

    let actor_ok = provision.actors.is_empty()
        || provision
            .actors
            .iter()
            .any(|a| a.matches(request.requester_role, &request.requester_organization));
    if !actor_ok {
        return false;
    }

    own_period.overlap_fraction(&request.time_range) > 0.0
}
