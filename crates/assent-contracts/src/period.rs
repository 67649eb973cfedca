//! UTC time periods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AssentError, AssentResult};

/// A closed UTC interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Build a period, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AssentResult<Self> {
        if start > end {
            return Err(AssentError::InvalidTimeRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// True when `instant` lies within the closed interval.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// True when `other` lies entirely within this period.
    pub fn encloses(&self, other: &Period) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The fraction of `other` that overlaps this period, in [0, 1].
    ///
    /// A zero-length `other` counts as 1.0 when its instant is contained and
    /// 0.0 otherwise.
    pub fn overlap_fraction(&self, other: &Period) -> f64 {
        let other_len = (other.end - other.start).num_milliseconds();
        if other_len <= 0 {
            return if self.contains(other.start) { 1.0 } else { 0.0 };
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start >= end {
            return 0.0;
        }
        let overlap = (end - start).num_milliseconds();
        (overlap as f64 / other_len as f64).clamp(0.0, 1.0)
    }

    /// The length of the period.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(Period::new(at(2025, 6, 1), at(2025, 1, 1)).is_err());
    }

    #[test]
    fn containment_is_closed_at_both_ends() {
        let p = Period::new(at(2025, 1, 1), at(2025, 12, 31)).unwrap();
        assert!(p.contains(at(2025, 1, 1)));
        assert!(p.contains(at(2025, 12, 31)));
        assert!(!p.contains(at(2026, 1, 1)));
    }

    #[test]
    fn enclosure_and_overlap() {
        let consent = Period::new(at(2025, 1, 1), at(2025, 6, 30)).unwrap();
        let inside = Period::new(at(2025, 3, 1), at(2025, 3, 2)).unwrap();
        let straddling = Period::new(at(2025, 6, 29), at(2025, 7, 5)).unwrap();

        assert!(consent.encloses(&inside));
        assert_eq!(consent.overlap_fraction(&inside), 1.0);

        assert!(!consent.encloses(&straddling));
        let f = consent.overlap_fraction(&straddling);
        assert!(f > 0.0 && f < 1.0, "partial overlap must decay, got {f}");
    }

    #[test]
    fn disjoint_overlap_is_zero() {
        let a = Period::new(at(2025, 1, 1), at(2025, 2, 1)).unwrap();
        let b = Period::new(at(2025, 3, 1), at(2025, 4, 1)).unwrap();
        assert_eq!(a.overlap_fraction(&b), 0.0);
    }
}
