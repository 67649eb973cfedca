//! # assent-temporal
//!
//! Timestamp parsing and period arithmetic for the ASSENT engine.
//!
//! The engine itself never reads the wall clock: `now` is always injected
//! into `validate` so test runs are reproducible. Production callers obtain
//! it from [`wall_clock_now`].
//!
//! ## Accepted timestamp forms
//!
//! | Form | Example | Strict | Lenient |
//! |---|---|---|---|
//! | RFC 3339, `Z` suffix | `2025-03-01T12:00:00Z` | yes | yes |
//! | RFC 3339, explicit offset | `2025-03-01T13:00:00+01:00` | yes | yes |
//! | Date only (UTC midnight) | `2025-03-01` | yes | yes |
//! | Unsuffixed datetime (documented UTC) | `2025-03-01T12:00:00` | no | yes |
//!
//! Anything else is an `AssentError::TimestampParse`. A comparison against
//! an unparsed instant is impossible by construction: parsing returns a
//! `DateTime<Utc>` or an error, never a partial value.

pub mod parse;

pub use parse::{parse_instant, parse_period, wall_clock_now, within_period};

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use assent_contracts::{AssentError, Period};

    use super::*;

    // ── parse_instant ─────────────────────────────────────────────────────────

    #[test]
    fn parses_zulu_suffix() {
        let t = parse_instant("2025-03-01T12:00:00Z", true).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn parses_explicit_offset_and_normalizes_to_utc() {
        let t = parse_instant("2025-03-01T13:00:00+01:00", true).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn parses_date_only_as_utc_midnight() {
        let t = parse_instant("2025-03-01", true).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn unsuffixed_datetime_requires_lenient_mode() {
        assert!(matches!(
            parse_instant("2025-03-01T12:00:00", true),
            Err(AssentError::TimestampParse { .. })
        ));

        let t = parse_instant("2025-03-01T12:00:00", false).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_rejected_in_both_modes() {
        for strict in [true, false] {
            assert!(parse_instant("last tuesday", strict).is_err());
            assert!(parse_instant("2025-13-40", strict).is_err());
            assert!(parse_instant("", strict).is_err());
        }
    }

    // ── parse_period / within_period ──────────────────────────────────────────

    #[test]
    fn period_parses_and_orders() {
        let p = parse_period("2025-01-01", "2025-12-31", true).unwrap();
        assert!(within_period(
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            &p
        ));
        assert!(!within_period(
            Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
            &p
        ));
    }

    #[test]
    fn period_rejects_inverted_bounds() {
        assert!(matches!(
            parse_period("2025-12-31", "2025-01-01", true),
            Err(AssentError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn period_surface_rejects_unparseable_side() {
        assert!(parse_period("2025-01-01", "whenever", true).is_err());
    }

    #[test]
    fn wall_clock_is_utc_and_monotone_enough() {
        let a = wall_clock_now();
        let b = wall_clock_now();
        assert!(b >= a);
        let _: Period = Period::new(a, b).unwrap();
    }
}
