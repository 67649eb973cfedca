//! Data-type sensitivity levels.

use std::collections::BTreeMap;

use assent_contracts::DataClass;

/// Sensitivity levels run 1 (routine) to 5 (highest).
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

/// Classes at or above this level trigger role-defined masking.
pub const MASKING_FLOOR: u8 = 3;

/// Level assigned to any class the table does not list.
pub const DEFAULT_LEVEL: u8 = 2;

/// Immutable data-type → sensitivity mapping.
#[derive(Debug, Clone)]
pub struct SensitivityTable {
    levels: BTreeMap<DataClass, u8>,
}

impl SensitivityTable {
    /// The seed table.
    pub fn builtin() -> Self {
        let seed: [(&str, u8); 9] = [
            ("Patient.demographics", 1),
            ("Observation.vital-signs", 1),
            ("Observation.laboratory", 2),
            ("DiagnosticReport.imaging", 2),
            ("Condition.diagnosis", 3),
            ("Condition.mental-health", 4),
            ("MedicationRequest.controlled", 4),
            ("AllergyIntolerance", 4),
            ("Observation.genetic", 5),
        ];
        let levels = seed
            .iter()
            .map(|(code, level)| {
                let class: DataClass = code.parse().unwrap_or_else(|_| {
                    // The seed codes are literals validated by the parser
                    // tests; this arm is unreachable for them.
                    DataClass::Any
                });
                (class, *level)
            })
            .collect();
        Self { levels }
    }

    /// The sensitivity level of a class. Unknown classes default to
    /// [`DEFAULT_LEVEL`].
    pub fn level(&self, class: &DataClass) -> u8 {
        self.levels.get(class).copied().unwrap_or(DEFAULT_LEVEL)
    }

    /// True when the class requires role-defined masking.
    pub fn requires_masking(&self, class: &DataClass) -> bool {
        self.level(class) >= MASKING_FLOOR
    }
}
