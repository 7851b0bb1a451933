//! Matching threshold configuration.

/// Eligibility thresholds for the candidate matcher.
///
/// A candidate is eligible when any of the three arms holds:
///
/// 1. token overlap ≥ `min_overlap`;
/// 2. token overlap ≥ `min_overlap_with_birthdate` and the birthdate
///    matches (exactly or day/month-swapped);
/// 3. the incoming name reduces to a single distinctive token of at least
///    `mononym_min_len` characters, that token is shared, and the birthdate
///    matches.
///
/// The defaults were recovered from observed behavior of the production
/// upload pipeline rather than from a documented tuning run; treat them as a
/// starting point and validate against labeled data before changing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchThresholds {
    pub min_overlap: usize,
    pub min_overlap_with_birthdate: usize,
    pub mononym_min_len: usize,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            min_overlap: 3,
            min_overlap_with_birthdate: 2,
            mononym_min_len: 4,
        }
    }
}

impl MatchThresholds {
    /// Tighter thresholds: name evidence alone is never enough.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            min_overlap: 4,
            min_overlap_with_birthdate: 3,
            mononym_min_len: 6,
        }
    }

    /// Looser thresholds for exploratory runs against sparse registries.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            min_overlap: 2,
            min_overlap_with_birthdate: 1,
            mononym_min_len: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_production_constants() {
        let thresholds = MatchThresholds::default();
        assert_eq!(thresholds.min_overlap, 3);
        assert_eq!(thresholds.min_overlap_with_birthdate, 2);
    }

    #[test]
    fn presets_order_sensibly() {
        assert!(MatchThresholds::strict().min_overlap > MatchThresholds::default().min_overlap);
        assert!(MatchThresholds::relaxed().min_overlap < MatchThresholds::default().min_overlap);
    }
}
