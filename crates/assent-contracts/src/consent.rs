//! Consents and their provision trees.
//!
//! A consent is a tree of `permit` / `deny` provisions. Nested deny
//! provisions carve exceptions out of their parent's grant; deny outranks
//! permit wherever both speak to a class. The engine only ever reads these
//! structures.

use serde::{Deserialize, Serialize};

use crate::{
    ids::{OpaqueId, PatientId},
    period::Period,
    terms::{ConsentStatus, DataClass, Purpose, Role},
};

/// Whether a provision grants or withdraws access to its classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionKind {
    Permit,
    Deny,
}

/// A role and/or organization constraint on who a provision applies to.
///
/// An empty constraint (both fields absent) matches nobody and is treated
/// as structurally invalid; a provision with no constraints at all matches
/// any requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl ActorConstraint {
    /// A constraint on a role alone.
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            organization: None,
        }
    }

    /// True when the requester satisfies every populated field.
    pub fn matches(&self, role: Role, organization: &str) -> bool {
        if self.role.is_none() && self.organization.is_none() {
            return false;
        }
        self.role.map_or(true, |r| r == role)
            && self
                .organization
                .as_deref()
                .map_or(true, |o| o == organization)
    }
}

/// One node of a consent's provision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provision {
    pub kind: ProvisionKind,
    /// Data classes this provision speaks about. Non-empty for a valid node.
    pub classes: Vec<DataClass>,
    /// Fine-grained codes (test identifiers and similar). Informational for
    /// the engine; echoed into snapshots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub codes: Vec<String>,
    /// Purposes the provision applies to. Empty means any purpose.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub purposes: Vec<Purpose>,
    /// Requester constraints. Empty means any requester.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<ActorConstraint>,
    /// Confidentiality tags carried through to snapshots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_labels: Vec<String>,
    /// Optional period narrower than the parent's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_period: Option<Period>,
    /// Child provisions, ordered. Children are exceptions to this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<Provision>,
}

impl Provision {
    /// A permit node over `classes` with no further constraints.
    pub fn permit(classes: Vec<DataClass>) -> Self {
        Self::node(ProvisionKind::Permit, classes)
    }

    /// A deny node over `classes` with no further constraints.
    pub fn deny(classes: Vec<DataClass>) -> Self {
        Self::node(ProvisionKind::Deny, classes)
    }

    fn node(kind: ProvisionKind, classes: Vec<DataClass>) -> Self {
        Self {
            kind,
            classes,
            codes: Vec::new(),
            purposes: Vec::new(),
            actors: Vec::new(),
            security_labels: Vec::new(),
            data_period: None,
            nested: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        1 + self.nested.iter().map(Provision::node_count).sum::<usize>()
    }

    /// Depth of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.nested.iter().map(Provision::depth).max().unwrap_or(0)
    }

    /// Structural soundness of this subtree: every node has classes, every
    /// actor constraint is non-empty, and every child period lies within its
    /// parent's effective period.
    pub fn is_well_formed(&self, effective: &Period) -> bool {
        if self.classes.is_empty() {
            return false;
        }
        if self.actors.iter().any(|a| a.role.is_none() && a.organization.is_none()) {
            return false;
        }
        let own = match &self.data_period {
            Some(p) => {
                if !effective.encloses(p) {
                    return false;
                }
                *p
            }
            None => *effective,
        };
        self.nested.iter().all(|child| child.is_well_formed(&own))
    }
}

/// A patient-authorized access policy over a time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consent {
    pub consent_id: OpaqueId,
    pub patient_id: PatientId,
    pub status: ConsentStatus,
    pub data_period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_provision: Option<Provision>,
}

impl Consent {
    /// Total provision nodes in the tree. Zero for an empty consent.
    pub fn node_count(&self) -> usize {
        self.top_provision.as_ref().map_or(0, Provision::node_count)
    }

    /// Maximum provision nesting depth. Zero for an empty consent.
    pub fn depth(&self) -> usize {
        self.top_provision.as_ref().map_or(0, Provision::depth)
    }

    /// Structural soundness: the tree (if any) is well-formed relative to
    /// the consent's own data period.
    pub fn is_well_formed(&self) -> bool {
        self.top_provision
            .as_ref()
            .map_or(true, |p| p.is_well_formed(&self.data_period))
    }
}
