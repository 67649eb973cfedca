//! Patient preferences consumed by the filtering pipeline.

use serde::{Deserialize, Serialize};

/// The closed set of patient preferences. All default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientPreferences {
    /// Mask demographic fields regardless of purpose.
    pub mask_demographic: bool,
    /// The patient declines any marketing use of their data.
    pub no_marketing: bool,
    /// The patient declines any research use of their data.
    pub no_research: bool,
    /// Contact details are released only for emergency treatment.
    pub contact_emergency_only: bool,
}

impl PatientPreferences {
    /// Marketing purposes require this to be true.
    pub fn allows_marketing(&self) -> bool {
        !self.no_marketing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_false() {
        let p = PatientPreferences::default();
        assert!(!p.mask_demographic);
        assert!(!p.no_marketing);
        assert!(!p.no_research);
        assert!(!p.contact_emergency_only);
        assert!(p.allows_marketing());
    }

    #[test]
    fn camel_case_wire_form() {
        let p: PatientPreferences =
            serde_json::from_str(r#"{"noMarketing": true, "maskDemographic": true}"#).unwrap();
        assert!(p.no_marketing);
        assert!(p.mask_demographic);
        assert!(!p.allows_marketing());
    }
}
