//! Purpose default durations and the purpose compatibility table.

use chrono::Duration;

use assent_contracts::Purpose;

/// The default access duration granted for a purpose, measured from the
/// request timestamp.
pub fn default_duration(purpose: Purpose) -> Duration {
    match purpose {
        Purpose::Treatment => Duration::days(30),
        Purpose::EmergencyTreatment => Duration::hours(24),
        Purpose::Payment => Duration::days(180),
        Purpose::Operations => Duration::days(90),
        Purpose::Research => Duration::days(5 * 365),
        Purpose::PublicHealth => Duration::days(365),
        Purpose::Marketing => Duration::days(90),
        Purpose::Directory => Duration::days(365),
    }
}

/// Compatibility score between the requested purpose and a consented
/// purpose, in [0, 1].
///
/// Exact matches score 1.0. The only documented compatible pair is routine
/// and emergency treatment at 0.7; every other pair is incompatible until
/// the table is extended.
pub fn compatibility(requested: Purpose, consented: Purpose) -> f64 {
    use Purpose::*;
    if requested == consented {
        return 1.0;
    }
    match (requested, consented) {
        (Treatment, EmergencyTreatment) | (EmergencyTreatment, Treatment) => 0.7,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_durations() {
        assert_eq!(default_duration(Purpose::Treatment), Duration::days(30));
        assert_eq!(default_duration(Purpose::EmergencyTreatment), Duration::hours(24));
        assert_eq!(default_duration(Purpose::Payment), Duration::days(180));
        assert_eq!(default_duration(Purpose::Operations), Duration::days(90));
        assert_eq!(default_duration(Purpose::Research), Duration::days(1825));
        assert_eq!(default_duration(Purpose::PublicHealth), Duration::days(365));
        assert_eq!(default_duration(Purpose::Marketing), Duration::days(90));
        assert_eq!(default_duration(Purpose::Directory), Duration::days(365));
    }

    #[test]
    fn treatment_and_emergency_are_mutually_compatible() {
        assert_eq!(compatibility(Purpose::Treatment, Purpose::EmergencyTreatment), 0.7);
        assert_eq!(compatibility(Purpose::EmergencyTreatment, Purpose::Treatment), 0.7);
    }

    #[test]
    fn payment_is_isolated() {
        for other in Purpose::ALL {
            if other != Purpose::Payment {
                assert_eq!(compatibility(Purpose::Payment, other), 0.0);
                assert_eq!(compatibility(other, Purpose::Payment), 0.0);
            }
        }
    }

    #[test]
    fn exact_match_scores_one() {
        for p in Purpose::ALL {
            assert_eq!(compatibility(p, p), 1.0);
        }
    }
}
