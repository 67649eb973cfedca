//! Trait seams of the engine.

use assent_contracts::{AccessRequest, Consent, Relationship};

/// Resolves the organizational relationship between a requester and the
/// custodian behind a consent.
///
/// The engine never infers relationships. The default implementation reads
/// the pre-materialized value the caller placed on the request; hosts with
/// a partner directory can plug in their own resolver.
pub trait RelationshipResolver: Send + Sync {
    fn classify(&self, request: &AccessRequest, consent: &Consent) -> Relationship;
}

/// The default resolver: trust the request's declared relationship, or
/// `Unknown` when none was supplied.
#[derive(Debug, Default)]
pub struct DeclaredRelationship;

impl RelationshipResolver for DeclaredRelationship {
    fn classify(&self, request: &AccessRequest, _consent: &Consent) -> Relationship {
        request.relationship.unwrap_or(Relationship::Unknown)
    }
}
