//! Role base capabilities.
//!
//! Each role carries allow/deny class globs, mask and pseudonymize field
//! lists, and the emergency override flag. The builtin table can be
//! replaced per-role from a TOML document; the result is a new immutable
//! table, never an in-place mutation.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use assent_contracts::{AssentError, AssentResult, DataClass, FieldPath, Role};

/// The base capability set of one requester role.
#[derive(Debug, Clone)]
pub struct RoleCapability {
    /// Class globs the role may read. `*` and bare resource classes act as
    /// wildcards, same as in provisions.
    pub allow: Vec<DataClass>,
    /// Class globs the role may never read. Denies outrank allows.
    pub deny: Vec<DataClass>,
    /// Fields masked when a sensitive class is released to this role.
    pub mask_fields: Vec<FieldPath>,
    /// Fields always pseudonymized for this role.
    pub pseudonymize_fields: Vec<FieldPath>,
    /// Whether the role participates in the emergency override.
    pub may_override_emergency: bool,
}

impl RoleCapability {
    /// True when `class` is covered by an allow glob and by no deny glob.
    pub fn permits(&self, class: &DataClass) -> bool {
        !self.denies(class) && self.allow.iter().any(|g| g.covers(class).is_hit())
    }

    /// True when `class` is covered by a deny glob.
    pub fn denies(&self, class: &DataClass) -> bool {
        self.deny.iter().any(|g| g.covers(class).is_hit())
    }
}

/// Immutable role → capability mapping.
#[derive(Debug, Clone)]
pub struct RoleTable {
    entries: BTreeMap<Role, RoleCapability>,
}

impl RoleTable {
    /// The builtin capability table.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();

        entries.insert(
            Role::Physician,
            capability(&["*"], &[], &["patient.identifier.value", "patient.telecom"], &[], true),
        );
        entries.insert(
            Role::Nurse,
            capability(
                &["*"],
                &["Observation.genetic", "MedicationRequest.controlled"],
                &["patient.identifier.value", "patient.telecom"],
                &[],
                true,
            ),
        );
        entries.insert(
            Role::Pharmacist,
            capability(
                &["MedicationRequest", "AllergyIntolerance", "Patient.demographics"],
                &["Observation.genetic", "Condition.mental-health"],
                &["patient.identifier.value"],
                &[],
                false,
            ),
        );
        entries.insert(
            Role::Researcher,
            capability(
                &["*"],
                &["MedicationRequest.controlled"],
                &["patient.identifier.value", "patient.telecom"],
                &["patient.identifier", "patient.name", "patient.contact", "patient.address"],
                false,
            ),
        );
        entries.insert(
            Role::Billing,
            capability(
                &["Patient.demographics", "Condition.diagnosis", "DiagnosticReport"],
                &["Observation.genetic", "Condition.mental-health", "MedicationRequest.controlled"],
                &["patient.telecom"],
                &[],
                false,
            ),
        );
        entries.insert(Role::Other, capability(&[], &["*"], &[], &[], false));

        Self { entries }
    }

    /// The capability of `role`. Total: every role has an entry.
    pub fn capability(&self, role: Role) -> &RoleCapability {
        // The constructors populate every role; the fallback entry keeps
        // the lookup total if a TOML override ever removes one.
        static FALLBACK: std::sync::OnceLock<RoleCapability> = std::sync::OnceLock::new();
        self.entries.get(&role).unwrap_or_else(|| {
            FALLBACK.get_or_init(|| RoleCapability {
                allow: Vec::new(),
                deny: vec![DataClass::Any],
                mask_fields: Vec::new(),
                pseudonymize_fields: Vec::new(),
                may_override_emergency: false,
            })
        })
    }

    /// Build a table from a TOML document, starting from the builtin
    /// entries and replacing each role the document lists.
    ///
    /// ```toml
    /// [roles.researcher]
    /// allow = ["*"]
    /// deny = ["MedicationRequest.controlled"]
    /// mask = ["patient.identifier.value"]
    /// pseudonymize = ["patient.identifier", "patient.name"]
    /// may_override_emergency = false
    /// ```
    pub fn from_toml_str(s: &str) -> AssentResult<Self> {
        let doc: RoleTableDoc = toml::from_str(s).map_err(|e| AssentError::Config {
            reason: format!("failed to parse role capability TOML: {}", e),
        })?;

        let mut table = Self::builtin();
        for (role_name, raw) in doc.roles {
            let role: Role = role_name.parse()?;
            debug!(role = %role, "replacing builtin role capability from TOML");
            table.entries.insert(role, raw.build()?);
        }
        Ok(table)
    }
}

fn capability(
    allow: &[&str],
    deny: &[&str],
    mask: &[&str],
    pseudonymize: &[&str],
    may_override_emergency: bool,
) -> RoleCapability {
    let classes = |codes: &[&str]| -> Vec<DataClass> {
        codes.iter().filter_map(|c| c.parse().ok()).collect()
    };
    let fields = |paths: &[&str]| -> Vec<FieldPath> {
        paths.iter().filter_map(|p| FieldPath::parse(*p).ok()).collect()
    };
    RoleCapability {
        allow: classes(allow),
        deny: classes(deny),
        mask_fields: fields(mask),
        pseudonymize_fields: fields(pseudonymize),
        may_override_emergency,
    }
}

// ── TOML schema ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RoleTableDoc {
    #[serde(default)]
    roles: BTreeMap<String, RawCapability>,
}

#[derive(Debug, Deserialize)]
struct RawCapability {
    #[serde(default)]
    allow: Vec<String>,
    #[serde(default)]
    deny: Vec<String>,
    #[serde(default)]
    mask: Vec<String>,
    #[serde(default)]
    pseudonymize: Vec<String>,
    #[serde(default)]
    may_override_emergency: bool,
}

impl RawCapability {
    fn build(self) -> AssentResult<RoleCapability> {
        let classes = |codes: Vec<String>| -> AssentResult<Vec<DataClass>> {
            codes.iter().map(|c| c.parse()).collect()
        };
        let fields = |paths: Vec<String>| -> AssentResult<Vec<FieldPath>> {
            paths.into_iter().map(FieldPath::parse).collect()
        };
        Ok(RoleCapability {
            allow: classes(self.allow)?,
            deny: classes(self.deny)?,
            mask_fields: fields(self.mask)?,
            pseudonymize_fields: fields(self.pseudonymize)?,
            may_override_emergency: self.may_override_emergency,
        })
    }
}
