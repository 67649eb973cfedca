//! Candidate matching: scoring active consents against a request.
//!
//! Each eligible consent is scored on four weighted axes; the best total at
//! or above the match threshold wins. Selection is fully deterministic:
//! ties fall through narrower period, deeper matched provision, then
//! lexicographic consent id.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use assent_contracts::{
    AccessRequest, Consent, ConsentStatus, CoverageDepth, DataClass, Provision, ScoreBreakdown,
};
use assent_terminology::compatibility;

use crate::{config::EngineConfig, traits::RelationshipResolver};

/// One scored candidate.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub consent: &'a Consent,
    pub breakdown: ScoreBreakdown,
    /// Deepest provision level (root = 1) where any requested class was
    /// covered. Used for tie-breaking.
    pub matched_depth: usize,
}

/// The matcher's verdict over the candidate set.
#[derive(Debug)]
pub enum MatchOutcome<'a> {
    /// The best candidate cleared the threshold.
    Best(Candidate<'a>),
    /// Nothing cleared the threshold. `best_effort` is the highest-scoring
    /// candidate if any were eligible at all; the emergency override uses it
    /// for audit attribution.
    None { best_effort: Option<Candidate<'a>> },
}

/// Everything the matcher learned about the candidate set.
#[derive(Debug)]
pub struct MatchReport<'a> {
    pub outcome: MatchOutcome<'a>,
    /// Total score per eligible candidate, keyed by consent id.
    pub candidate_scores: BTreeMap<String, f64>,
    /// True when at least one active, in-period consent was excluded for
    /// structural invalidity.
    pub any_malformed: bool,
}

/// Score all candidates and select the best match.
pub fn select<'a>(
    request: &AccessRequest,
    consents: &'a [Consent],
    now: DateTime<Utc>,
    config: &EngineConfig,
    resolver: &dyn RelationshipResolver,
) -> MatchReport<'a> {
    let mut candidate_scores = BTreeMap::new();
    let mut any_malformed = false;
    let mut best: Option<Candidate<'a>> = None;

    for consent in consents {
        if consent.status != ConsentStatus::Active {
            continue;
        }
        if !consent.data_period.contains(now) {
            continue;
        }
        if !consent.is_well_formed() {
            warn!(consent_id = %consent.consent_id, "excluding structurally invalid consent");
            any_malformed = true;
            continue;
        }

        let candidate = score(request, consent, resolver);
        debug!(
            consent_id = %consent.consent_id,
            data_type = candidate.breakdown.data_type,
            purpose = candidate.breakdown.purpose,
            requester = candidate.breakdown.requester,
            temporal = candidate.breakdown.temporal,
            total = candidate.breakdown.total,
            "scored candidate"
        );
        candidate_scores.insert(consent.consent_id.to_string(), candidate.breakdown.total);

        best = Some(match best {
            None => candidate,
            Some(current) => {
                if prefer(&candidate, &current) {
                    candidate
                } else {
                    current
                }
            }
        });
    }

    let outcome = match best {
        Some(candidate) if candidate.breakdown.total >= config.minimum_match_threshold => {
            MatchOutcome::Best(candidate)
        }
        other => {
            if let Some(c) = &other {
                debug!(
                    consent_id = %c.consent.consent_id,
                    total = c.breakdown.total,
                    threshold = config.minimum_match_threshold,
                    "best candidate fell below the match threshold"
                );
            }
            MatchOutcome::None { best_effort: other }
        }
    };

    MatchReport {
        outcome,
        candidate_scores,
        any_malformed,
    }
}

/// Score one consent on the four axes.
pub fn score<'a>(
    request: &AccessRequest,
    consent: &'a Consent,
    resolver: &dyn RelationshipResolver,
) -> Candidate<'a> {
    let (data_type, matched_depth) = data_type_axis(consent, &request.data_types);
    let purpose = purpose_axis(consent, request);
    let requester = requester_axis(consent, request, resolver);
    let temporal = temporal_axis(consent, request);

    Candidate {
        consent,
        breakdown: ScoreBreakdown::weighted(data_type, purpose, requester, temporal),
        matched_depth,
    }
}

/// True when `a` should be preferred over `b`.
fn prefer(a: &Candidate<'_>, b: &Candidate<'_>) -> bool {
    if a.breakdown.total != b.breakdown.total {
        return a.breakdown.total > b.breakdown.total;
    }
    let (da, db) = (a.consent.data_period.duration(), b.consent.data_period.duration());
    if da != db {
        return da < db;
    }
    if a.matched_depth != b.matched_depth {
        return a.matched_depth > b.matched_depth;
    }
    a.consent.consent_id < b.consent.consent_id
}

// ── Axes ──────────────────────────────────────────────────────────────────────

/// Mean best-coverage over the requested classes, plus the deepest level at
/// which any class was covered.
fn data_type_axis(consent: &Consent, requested: &[DataClass]) -> (f64, usize) {
    let Some(root) = &consent.top_provision else {
        return (0.0, 0);
    };
    let mut sum = 0.0;
    let mut deepest = 0;
    for class in requested {
        let mut best = (CoverageDepth::Miss, 0usize);
        best_coverage(root, class, 1, &mut best);
        sum += best.0.score();
        if best.0.is_hit() {
            deepest = deepest.max(best.1);
        }
    }
    (sum / requested.len() as f64, deepest)
}

fn best_coverage(
    provision: &Provision,
    requested: &DataClass,
    level: usize,
    best: &mut (CoverageDepth, usize),
) {
    for class in &provision.classes {
        let depth = class.covers(requested);
        if depth > best.0 || (depth == best.0 && depth.is_hit() && level > best.1) {
            *best = (depth, level);
        }
    }
    for child in &provision.nested {
        best_coverage(child, requested, level + 1, best);
    }
}

/// Best purpose compatibility anywhere in the tree. A provision without
/// purposes applies to any purpose and scores 1.0.
fn purpose_axis(consent: &Consent, request: &AccessRequest) -> f64 {
    fn walk(provision: &Provision, request: &AccessRequest, best: &mut f64) {
        let here = if provision.purposes.is_empty() {
            1.0
        } else {
            provision
                .purposes
                .iter()
                .map(|p| compatibility(request.purpose, *p))
                .fold(0.0, f64::max)
        };
        *best = best.max(here);
        for child in &provision.nested {
            walk(child, request, best);
        }
    }
    let Some(root) = &consent.top_provision else {
        return 0.0;
    };
    let mut best = 0.0;
    walk(root, request, &mut best);
    best
}

/// Explicit actor match scores 1.0; an entirely unconstrained tree scores
/// 1.0; otherwise the organizational relationship decides.
fn requester_axis(
    consent: &Consent,
    request: &AccessRequest,
    resolver: &dyn RelationshipResolver,
) -> f64 {
    fn walk(provision: &Provision, request: &AccessRequest, any: &mut bool, hit: &mut bool) {
        for actor in &provision.actors {
            *any = true;
            if actor.matches(request.requester_role, &request.requester_organization) {
                *hit = true;
            }
        }
        for child in &provision.nested {
            walk(child, request, any, hit);
        }
    }
    let Some(root) = &consent.top_provision else {
        return 0.0;
    };
    let mut any_constraint = false;
    let mut explicit_hit = false;
    walk(root, request, &mut any_constraint, &mut explicit_hit);

    if explicit_hit || !any_constraint {
        1.0
    } else {
        resolver.classify(request, consent).score()
    }
}

/// Full containment scores 1.0; partial overlap decays linearly.
fn temporal_axis(consent: &Consent, request: &AccessRequest) -> f64 {
    if consent.data_period.encloses(&request.time_range) {
        1.0
    } else {
        consent.data_period.overlap_fraction(&request.time_range)
    }
}

#[cfg(test)]
mod tests {
    use assent_contracts::{ActorConstraint, Purpose, Relationship, Role};

    use crate::testutil::{active_consent, at, base_request, period, permit};
    use crate::traits::DeclaredRelationship;

    use super::*;

    fn run<'a>(request: &AccessRequest, consents: &'a [Consent]) -> MatchReport<'a> {
        select(
            request,
            consents,
            at("2025-03-01T12:00:00Z"),
            &EngineConfig::default(),
            &DeclaredRelationship,
        )
    }

    #[test]
    fn exact_match_scores_one_on_every_axis() {
        let request = base_request();
        let mut top = permit(&["Patient.demographics", "Observation.vital-signs"]);
        top.purposes = vec![Purpose::Treatment];
        top.actors = vec![ActorConstraint::role(Role::Physician)];
        let consent = active_consent("c-exact", Some(top));

        let candidate = score(&request, &consent, &DeclaredRelationship);
        assert_eq!(candidate.breakdown.data_type, 1.0);
        assert_eq!(candidate.breakdown.purpose, 1.0);
        assert_eq!(candidate.breakdown.requester, 1.0);
        assert_eq!(candidate.breakdown.temporal, 1.0);
        assert!((candidate.breakdown.total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn parent_class_coverage_scores_point_seven() {
        let mut request = base_request();
        request.data_types = vec!["Observation.genetic".parse().unwrap()];
        let consent = active_consent("c-parent", Some(permit(&["Observation"])));

        let candidate = score(&request, &consent, &DeclaredRelationship);
        assert_eq!(candidate.breakdown.data_type, 0.7);
    }

    #[test]
    fn unknown_requester_scores_point_two() {
        let mut request = base_request();
        request.requester_role = Role::Researcher;
        let mut top = permit(&["Patient.demographics", "Observation.vital-signs"]);
        top.actors = vec![ActorConstraint::role(Role::Physician)];
        let consent = active_consent("c-actor", Some(top));

        let candidate = score(&request, &consent, &DeclaredRelationship);
        assert_eq!(candidate.breakdown.requester, 0.2);
    }

    #[test]
    fn declared_relationship_raises_requester_axis() {
        let mut request = base_request();
        request.requester_role = Role::Researcher;
        request.relationship = Some(Relationship::NetworkPartner);
        let mut top = permit(&["Patient.demographics", "Observation.vital-signs"]);
        top.actors = vec![ActorConstraint::role(Role::Physician)];
        let consent = active_consent("c-rel", Some(top));

        let candidate = score(&request, &consent, &DeclaredRelationship);
        assert_eq!(candidate.breakdown.requester, 0.8);
    }

    #[test]
    fn inactive_and_out_of_period_consents_are_ineligible() {
        let request = base_request();
        let mut inactive = active_consent("c-inactive", Some(permit(&["*"])));
        inactive.status = ConsentStatus::Inactive;
        let mut expired = active_consent("c-expired", Some(permit(&["*"])));
        expired.data_period = period("2020-01-01", "2020-12-31");

        let consents = vec![inactive, expired];
        let report = run(&request, &consents);
        assert!(matches!(report.outcome, MatchOutcome::None { best_effort: None }));
        assert!(report.candidate_scores.is_empty());
    }

    #[test]
    fn malformed_consent_is_excluded_and_flagged() {
        let request = base_request();
        let consent = active_consent("c-bad", Some(permit(&[])));
        let consents = vec![consent];
        let report = run(&request, &consents);
        assert!(report.any_malformed);
        assert!(matches!(report.outcome, MatchOutcome::None { best_effort: None }));
    }

    #[test]
    fn below_threshold_keeps_best_effort() {
        let mut request = base_request();
        request.data_types = vec!["AllergyIntolerance".parse().unwrap()];
        request.requester_role = Role::Nurse;
        let mut top = permit(&["Observation"]);
        top.purposes = vec![Purpose::Treatment];
        top.actors = vec![ActorConstraint::role(Role::Physician)];
        let consents = vec![active_consent("c-weak", Some(top))];

        let report = run(&request, &consents);
        match report.outcome {
            MatchOutcome::None { best_effort: Some(c) } => {
                assert!(c.breakdown.total < 0.7);
                assert_eq!(c.consent.consent_id.as_str(), "c-weak");
            }
            other => panic!("expected below-threshold best effort, got {:?}", other),
        }
    }

    #[test]
    fn tie_breaks_prefer_narrower_period_then_id() {
        let request = base_request();
        let mut wide = active_consent("a-wide", Some(permit(&["Patient.demographics", "Observation.vital-signs"])));
        wide.data_period = period("2024-01-01", "2026-12-31");
        let narrow = active_consent("z-narrow", Some(permit(&["Patient.demographics", "Observation.vital-signs"])));

        let consents = vec![wide, narrow];
        let report = run(&request, &consents);
        match report.outcome {
            MatchOutcome::Best(c) => assert_eq!(c.consent.consent_id.as_str(), "z-narrow"),
            other => panic!("expected a best match, got {:?}", other),
        }

        // Identical periods: lexicographic id decides.
        let first = active_consent("a-first", Some(permit(&["Patient.demographics", "Observation.vital-signs"])));
        let second = active_consent("b-second", Some(permit(&["Patient.demographics", "Observation.vital-signs"])));
        let consents = vec![second, first];
        let report = run(&request, &consents);
        match report.outcome {
            MatchOutcome::Best(c) => assert_eq!(c.consent.consent_id.as_str(), "a-first"),
            other => panic!("expected a best match, got {:?}", other),
        }
    }

    #[test]
    fn candidate_scores_record_every_eligible_consent() {
        let request = base_request();
        let strong = active_consent("c-strong", Some(permit(&["Patient.demographics", "Observation.vital-signs"])));
        let weak = active_consent("c-weaker", Some(permit(&["Condition.diagnosis"])));
        let consents = vec![strong, weak];

        let report = run(&request, &consents);
        assert_eq!(report.candidate_scores.len(), 2);
        assert!(report.candidate_scores["c-strong"] > report.candidate_scores["c-weaker"]);
    }
}
