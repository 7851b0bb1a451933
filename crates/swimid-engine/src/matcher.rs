//! Candidate scoring and ranking.
//!
//! Scores registry candidates against a normalized incoming record by token
//! overlap, birthdate agreement and gender agreement, then ranks them
//! deterministically. The ranked list is consumed by the resolver, which only
//! ever looks at the top entry and whether anything ties with it.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use rapidfuzz::distance::jaro_winkler;
use tracing::trace;

use swimid_model::{
    AthleteRecord, BirthdateAgreement, CandidateDiagnostic, CandidateFate, ForeignAthleteRecord,
    Gender, MatchOutcome, NationCode, RegistryId,
};

use crate::config::MatchThresholds;
use crate::normalize::{NormalizedName, is_initial};
use crate::store::{AthleteCandidate, ForeignCandidate};

/// How a candidate's stored birthdate relates to the incoming one, including
/// the transposed-form test: when the dates differ, the day/month-swapped
/// incoming date is tried before declaring a mismatch.
pub fn birthdate_agreement(
    incoming: Option<NaiveDate>,
    stored: Option<NaiveDate>,
) -> BirthdateAgreement {
    let (Some(incoming), Some(stored)) = (incoming, stored) else {
        return BirthdateAgreement::Unknown;
    };
    if incoming == stored {
        return BirthdateAgreement::Exact;
    }
    // A swap that changes nothing (day == month) is not a swap, and a day
    // over 12 cannot be a month.
    if incoming.day() != incoming.month()
        && let Some(swapped) =
            NaiveDate::from_ymd_opt(incoming.year(), incoming.day(), incoming.month())
        && swapped == stored
    {
        return BirthdateAgreement::DayMonthSwapped;
    }
    BirthdateAgreement::Mismatch
}

/// Gender conflict requires both sides to be known and to differ; unknown on
/// either side never penalizes anyone.
pub fn genders_agree(incoming: Option<Gender>, stored: Option<Gender>) -> bool {
    match (incoming, stored) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// A scored and classified registry candidate.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub reference: RegistryId,
    /// Nation code of the stored record. Decisions always take nationality
    /// from the registry, never from the incoming row.
    pub nation: NationCode,
    pub matched_name: String,
    pub alias_used: Option<String>,
    /// Shared multi-character tokens; the primary ranking key.
    pub overlap: usize,
    /// Shared initials; diagnostic only.
    pub initials_matched: usize,
    pub birthdate: BirthdateAgreement,
    pub gender_agrees: bool,
    /// Whole-name Jaro-Winkler ratio, recorded for reviewer triage. Never a
    /// ranking input.
    pub name_similarity: f64,
    pub eligible: bool,
    /// Raw numeric id, used only as the final display-order key.
    id_key: u32,
}

impl ScoredCandidate {
    /// The three ranking keys, in order. Two candidates equal on this key are
    /// tied for resolution purposes regardless of id.
    pub fn rank_key(&self) -> (usize, u8, bool) {
        (self.overlap, self.birthdate.rank(), self.gender_agrees)
    }

    /// The outcome this candidate produces when it wins its stage.
    pub fn into_outcome(self) -> MatchOutcome {
        match self.reference {
            RegistryId::Athlete(id) => MatchOutcome::Athlete {
                id,
                nation: self.nation,
            },
            RegistryId::Foreign(id) => MatchOutcome::Foreign {
                id,
                nation: self.nation,
            },
        }
    }

    pub fn into_diagnostic(self, fate: CandidateFate) -> CandidateDiagnostic {
        CandidateDiagnostic {
            reference: self.reference,
            matched_name: self.matched_name,
            alias_used: self.alias_used,
            overlap: self.overlap,
            initials_matched: self.initials_matched,
            birthdate: self.birthdate,
            gender_agrees: self.gender_agrees,
            name_similarity: self.name_similarity,
            fate,
        }
    }
}

/// Scores candidates from either registry against one incoming record.
#[derive(Debug, Clone, Default)]
pub struct CandidateMatcher {
    thresholds: MatchThresholds,
}

impl CandidateMatcher {
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Score every athlete name variant and keep the best variant per record,
    /// ranked best-first.
    pub fn rank_athletes(
        &self,
        name: &NormalizedName,
        birthdate: Option<NaiveDate>,
        gender: Option<Gender>,
        candidates: &[AthleteCandidate<'_>],
    ) -> Vec<ScoredCandidate> {
        let mut best_per_record: BTreeMap<u32, ScoredCandidate> = BTreeMap::new();
        for candidate in candidates {
            let scored = self.score_variant(
                name,
                birthdate,
                gender,
                RegistryId::Athlete(candidate.record.id),
                candidate.record.id.get(),
                candidate.name,
                candidate.alias_used,
                candidate.tokens,
                athlete_birthdate(candidate.record),
                candidate.record.gender,
                &candidate.record.nation,
            );
            match best_per_record.entry(candidate.record.id.get()) {
                std::collections::btree_map::Entry::Vacant(entry) => {
                    entry.insert(scored);
                }
                std::collections::btree_map::Entry::Occupied(mut entry) => {
                    if variant_outranks(&scored, entry.get()) {
                        entry.insert(scored);
                    }
                }
            }
        }
        let mut ranked: Vec<ScoredCandidate> = best_per_record.into_values().collect();
        sort_ranked(&mut ranked);
        ranked
    }

    /// Score foreign-athlete candidates, ranked best-first.
    pub fn rank_foreign(
        &self,
        name: &NormalizedName,
        birthdate: Option<NaiveDate>,
        gender: Option<Gender>,
        candidates: &[ForeignCandidate<'_>],
    ) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|candidate| {
                self.score_variant(
                    name,
                    birthdate,
                    gender,
                    RegistryId::Foreign(candidate.record.id),
                    candidate.record.id.get(),
                    &candidate.record.full_name,
                    false,
                    candidate.tokens,
                    foreign_birthdate(candidate.record),
                    candidate.record.gender,
                    &candidate.record.nation,
                )
            })
            .collect();
        sort_ranked(&mut ranked);
        ranked
    }

    #[allow(clippy::too_many_arguments)]
    fn score_variant(
        &self,
        name: &NormalizedName,
        birthdate: Option<NaiveDate>,
        gender: Option<Gender>,
        reference: RegistryId,
        id_key: u32,
        stored_name: &str,
        alias_used: bool,
        stored_tokens: &BTreeSet<String>,
        stored_birthdate: Option<NaiveDate>,
        stored_gender: Option<Gender>,
        stored_nation: &NationCode,
    ) -> ScoredCandidate {
        // Overlap is counted on canonical tokens so a shared word counts
        // once however many nickname spellings its group carries.
        let mut overlap = 0usize;
        let mut initials = 0usize;
        for token in name.canonical_tokens().intersection(stored_tokens) {
            if is_initial(token) {
                initials += 1;
            } else {
                overlap += 1;
            }
        }

        let agreement = birthdate_agreement(birthdate, stored_birthdate);
        let gender_ok = genders_agree(gender, stored_gender);
        let eligible = self.is_eligible(name, stored_tokens, overlap, agreement);

        let similarity = jaro_winkler::similarity(
            name.original().to_lowercase().chars(),
            stored_name.to_lowercase().chars(),
        );

        trace!(
            candidate = %reference,
            overlap,
            initials,
            birthdate = ?agreement,
            gender_ok,
            eligible,
            "scored candidate"
        );

        ScoredCandidate {
            reference,
            nation: stored_nation.clone(),
            matched_name: stored_name.to_string(),
            alias_used: alias_used.then(|| stored_name.to_string()),
            overlap,
            initials_matched: initials,
            birthdate: agreement,
            gender_agrees: gender_ok,
            name_similarity: similarity,
            eligible,
            id_key,
        }
    }

    /// The three-way eligibility rule: enough overlapping words, or fewer
    /// words backed by a matching birthdate, or a distinctive mononym backed
    /// by a matching birthdate.
    fn is_eligible(
        &self,
        name: &NormalizedName,
        stored_tokens: &BTreeSet<String>,
        overlap: usize,
        agreement: BirthdateAgreement,
    ) -> bool {
        if overlap >= self.thresholds.min_overlap {
            return true;
        }
        if overlap >= self.thresholds.min_overlap_with_birthdate && agreement.is_match() {
            return true;
        }
        if agreement.is_match()
            && name.significant_count() == 1
            && let Some(token) = name.significant_tokens().next()
            && token.chars().count() >= self.thresholds.mononym_min_len
            && stored_tokens.contains(token)
        {
            return true;
        }
        false
    }
}

fn athlete_birthdate(record: &AthleteRecord) -> Option<NaiveDate> {
    record.birthdate
}

fn foreign_birthdate(record: &ForeignAthleteRecord) -> Option<NaiveDate> {
    record.birthdate
}

/// Best rank wins; on a fully tied key the primary spelling beats an alias so
/// the diagnostic names the record the way the registry does.
fn variant_outranks(challenger: &ScoredCandidate, incumbent: &ScoredCandidate) -> bool {
    match challenger.rank_key().cmp(&incumbent.rank_key()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => incumbent.alias_used.is_some() && challenger.alias_used.is_none(),
    }
}

/// Rank best-first; id ascending is a display-order key only and never
/// resolves a tie at decision level.
fn sort_ranked(ranked: &mut [ScoredCandidate]) {
    ranked.sort_by(|a, b| {
        b.rank_key()
            .cmp(&a.rank_key())
            .then_with(|| a.id_key.cmp(&b.id_key))
    });
}
