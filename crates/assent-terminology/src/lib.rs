//! # assent-terminology
//!
//! The static lookup tables of the ASSENT engine: data-type sensitivity,
//! purpose default durations and compatibility, role base capabilities, and
//! the safety-critical class set used by the emergency override.
//!
//! All lookups are pure and total. Tables are immutable after construction;
//! the process-wide builtin snapshot is initialized once and shared without
//! synchronization. Replacing tables means building a new
//! [`TerminologyRegistry`] value; there is no in-place mutation.

use std::sync::OnceLock;

use assent_contracts::DataClass;

pub mod purpose;
pub mod role;
pub mod sensitivity;

pub use purpose::{compatibility, default_duration};
pub use role::{RoleCapability, RoleTable};
pub use sensitivity::{SensitivityTable, DEFAULT_LEVEL, MASKING_FLOOR};

use assent_contracts::AssentResult;

/// The immutable registry snapshot the engine reads on every call.
#[derive(Debug, Clone)]
pub struct TerminologyRegistry {
    pub sensitivity: SensitivityTable,
    pub roles: RoleTable,
}

impl TerminologyRegistry {
    /// The builtin registry.
    pub fn builtin() -> Self {
        Self {
            sensitivity: SensitivityTable::builtin(),
            roles: RoleTable::builtin(),
        }
    }

    /// Builtin registry with role capabilities replaced from TOML.
    pub fn with_roles_from_toml(s: &str) -> AssentResult<Self> {
        Ok(Self {
            sensitivity: SensitivityTable::builtin(),
            roles: RoleTable::from_toml_str(s)?,
        })
    }
}

/// The process-wide builtin snapshot. Safe for shared, unsynchronized reads
/// from any number of threads.
pub fn registry() -> &'static TerminologyRegistry {
    static REGISTRY: OnceLock<TerminologyRegistry> = OnceLock::new();
    REGISTRY.get_or_init(TerminologyRegistry::builtin)
}

/// The classes the emergency override may force-allow. Nothing outside this
/// set is ever expanded by the override.
pub fn safety_critical_classes() -> &'static [DataClass] {
    static CLASSES: OnceLock<Vec<DataClass>> = OnceLock::new();
    CLASSES.get_or_init(|| {
        ["AllergyIntolerance", "Condition.critical", "Observation.vital-signs"]
            .iter()
            .filter_map(|c| c.parse().ok())
            .collect()
    })
}
