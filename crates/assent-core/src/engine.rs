//! The decision engine: one `validate` call from request to bundle.
//!
//! Pipeline: input validation → candidate matching → provision evaluation →
//! filtering → emergency override → assembly → interop emission. The engine
//! is stateless per call and performs no I/O; `now` is always injected.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use assent_contracts::{
    AccessRequest, AssentError, AssentResult, AuditInfo, Consent, Decision, DecisionBundle,
    DecisionKind, PatientPreferences, PermissionSet, Reason, ReasonCode, ScoreBreakdown,
};
use assent_interop::{audit_event, consent_snapshot};
use assent_terminology::TerminologyRegistry;

use crate::{
    assembler::{compute_expiry, derive_access_handle, request_fingerprint, restrictions_for},
    config::EngineConfig,
    emergency, evaluator, filter,
    matcher::{self, MatchOutcome},
    traits::{DeclaredRelationship, RelationshipResolver},
};

/// The ASSENT consent decision engine.
///
/// Holds only immutable configuration and table snapshots; a single
/// instance may serve any number of concurrent `validate` calls without
/// synchronization.
pub struct DecisionEngine {
    config: EngineConfig,
    terminology: TerminologyRegistry,
    resolver: Box<dyn RelationshipResolver>,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionEngine {
    /// Engine with default configuration and the builtin terminology.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine with the given configuration and the builtin terminology.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            terminology: TerminologyRegistry::builtin(),
            resolver: Box::new(DeclaredRelationship),
        }
    }

    /// Replace the terminology snapshot.
    pub fn with_terminology(mut self, terminology: TerminologyRegistry) -> Self {
        self.terminology = terminology;
        self
    }

    /// Replace the relationship resolver.
    pub fn with_resolver(mut self, resolver: Box<dyn RelationshipResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse a host-supplied timestamp with the configured strictness.
    ///
    /// Hosts that receive consents or requests as text parse their instants
    /// through here so `strict_timestamp_parsing` is honored uniformly.
    pub fn parse_instant(&self, value: &str) -> AssentResult<DateTime<Utc>> {
        assent_temporal::parse_instant(value, self.config.strict_timestamp_parsing)
    }

    /// Decide one access request against the patient's active consents.
    ///
    /// Returns `Err` only for malformed inputs; every policy outcome
    /// (approval, denial, pending) travels inside the bundle. The audit
    /// event is built before the bundle is returned, for approvals and
    /// refusals alike.
    pub fn validate(
        &self,
        request: &AccessRequest,
        consents: &[Consent],
        now: DateTime<Utc>,
        preferences: &PatientPreferences,
    ) -> AssentResult<DecisionBundle> {
        request.validate()?;
        self.check_tree_bounds(consents)?;

        let fingerprint = request_fingerprint(request)?;
        debug!(
            request_id = %request.request_id,
            patient_id = %request.patient_id,
            purpose = %request.purpose,
            role = %request.requester_role,
            candidates = consents.len(),
            "validate starting"
        );

        let report = matcher::select(request, consents, now, &self.config, self.resolver.as_ref());

        // ── Normal pipeline ───────────────────────────────────────────────────
        let mut set = PermissionSet::new();
        let mut denial: Option<ReasonCode> = None;
        let mut pending = false;
        let mut matched: Option<&Consent> = None;
        let mut breakdown: Option<ScoreBreakdown> = None;

        match &report.outcome {
            MatchOutcome::Best(candidate) => {
                matched = Some(candidate.consent);
                breakdown = Some(candidate.breakdown);

                if self.config.require_reconsent
                    && candidate.breakdown.total < self.config.reuse_threshold
                {
                    pending = true;
                    denial = Some(ReasonCode::ReconsentRequired);
                } else if !candidate.consent.data_period.encloses(&request.time_range) {
                    denial = Some(ReasonCode::TemporalOutOfScope);
                } else {
                    set = evaluator::evaluate(candidate.consent, request);
                    if set.allowed.is_empty() {
                        denial = Some(ReasonCode::EmptyPermissions);
                    } else if !set.missing_from(&request.data_types).is_empty() {
                        denial = Some(ReasonCode::PartialCoverage);
                    } else {
                        denial = filter::apply_filters(
                            &mut set,
                            request,
                            preferences,
                            &self.terminology,
                        );
                    }
                }
            }
            MatchOutcome::None { best_effort } => {
                matched = best_effort.as_ref().map(|c| c.consent);
                breakdown = best_effort.as_ref().map(|c| c.breakdown);
                denial = Some(
                    if report.candidate_scores.is_empty() && report.any_malformed {
                        ReasonCode::MalformedConsent
                    } else {
                        ReasonCode::NoMatchingConsent
                    },
                );
            }
        }

        // ── Emergency override ────────────────────────────────────────────────
        //
        // Requires an attributable consent: the audit event must name the
        // consent the grant is recorded against.
        let mut emergency_applied = false;
        if emergency::eligible(request, &self.terminology) && matched.is_some() {
            let forced = emergency::force_safety_critical(&mut set, request);
            if !forced.is_empty() {
                emergency_applied = true;
                filter::sensitivity_filter(&mut set, request, &self.terminology);
                if denial.is_some() && !set.allowed.is_empty() {
                    denial = None;
                    pending = false;
                }
            }
        }

        set.normalize();

        // ── Assembly ──────────────────────────────────────────────────────────
        let kind = if denial.is_none() {
            DecisionKind::Approved
        } else if pending {
            DecisionKind::Pending
        } else {
            DecisionKind::Denied
        };
        let reason_code = match (kind, denial) {
            (DecisionKind::Approved, _) if emergency_applied => ReasonCode::EmergencyAccess,
            (DecisionKind::Approved, _) => ReasonCode::Matched,
            (_, Some(code)) => code,
            // denial is always Some for non-approved kinds.
            (_, None) => ReasonCode::EmptyPermissions,
        };

        let (permissions, access_handle, restrictions, snapshot) = match (kind, matched) {
            (DecisionKind::Approved, Some(consent)) => {
                let emergency_cap =
                    emergency_applied.then_some((now, self.config.emergency_cap_hours));
                let expiry =
                    compute_expiry(request, Some(consent.data_period.end), emergency_cap);
                let handle =
                    derive_access_handle(&request.request_id, &consent.consent_id, expiry)?;
                let restrictions = restrictions_for(&set, emergency_applied);
                let snapshot =
                    consent_snapshot(request, &set, &consent.data_period, &consent.consent_id);
                (Some(set.clone()), Some(handle), restrictions, Some(snapshot))
            }
            _ => (None, None, Vec::new(), None),
        };

        let audit_info = AuditInfo {
            request_fingerprint: fingerprint.clone(),
            matched_consent_id: matched.map(|c| c.consent_id.clone()),
            score_breakdown: breakdown,
            candidate_scores: report.candidate_scores,
            emergency_override: emergency_applied,
        };

        // The audit event exists before the decision leaves the engine.
        let audit_event = audit_event(
            request,
            kind == DecisionKind::Approved,
            audit_info.matched_consent_id.as_ref(),
            &fingerprint,
            now,
        );

        match kind {
            DecisionKind::Approved => info!(
                request_id = %request.request_id,
                reason = ?reason_code,
                emergency = emergency_applied,
                "request approved"
            ),
            _ => warn!(
                request_id = %request.request_id,
                kind = ?kind,
                reason = ?reason_code,
                "request refused"
            ),
        }

        Ok(DecisionBundle {
            decision: Decision {
                kind,
                reason: Reason::from_code(reason_code),
                permissions,
                access_handle,
                restrictions,
                audit_info,
            },
            consent_snapshot: snapshot,
            audit_event,
        })
    }

    fn check_tree_bounds(&self, consents: &[Consent]) -> AssentResult<()> {
        for consent in consents {
            let nodes = consent.node_count();
            let depth = consent.depth();
            if nodes > self.config.max_provision_nodes || depth > self.config.max_provision_depth {
                return Err(AssentError::OversizedConsentTree {
                    consent_id: consent.consent_id.to_string(),
                    nodes,
                    max_nodes: self.config.max_provision_nodes,
                    depth,
                    max_depth: self.config.max_provision_depth,
                });
            }
        }
        Ok(())
    }
}
