//! In-memory registry store with an inverted token index.
//!
//! Built once per batch run from the loaded registries. Name tokens are
//! normalized at build time with the same [`NameNormalizer`] the engine
//! resolves with, so index and matcher can never disagree about
//! tokenization. All queries are pure reads; the store is immutable after
//! construction.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::debug;

use swimid_engine::normalize::NameNormalizer;
use swimid_engine::store::{AthleteCandidate, ForeignCandidate, IdentityStore};
use swimid_model::{AthleteRecord, ForeignAthleteRecord, NationCorrection};

use crate::error::{Result, StoreError};

/// One indexed spelling of an athlete's name (primary or alias).
#[derive(Debug)]
struct AthleteNameEntry {
    record_idx: usize,
    name: String,
    tokens: BTreeSet<String>,
    alias: bool,
}

#[derive(Debug)]
struct ForeignNameEntry {
    record_idx: usize,
    tokens: BTreeSet<String>,
}

/// Immutable, token-indexed view over both registries and the correction
/// table.
#[derive(Debug)]
pub struct InMemoryStore {
    athletes: Vec<AthleteRecord>,
    foreign: Vec<ForeignAthleteRecord>,
    corrections: Vec<(BTreeSet<String>, NationCorrection)>,
    athlete_names: Vec<AthleteNameEntry>,
    foreign_names: Vec<ForeignNameEntry>,
    athlete_index: BTreeMap<String, Vec<usize>>,
    foreign_index: BTreeMap<String, Vec<usize>>,
}

impl InMemoryStore {
    /// Build the store, indexing every athlete spelling (primary name and
    /// each alias) and every foreign name.
    ///
    /// Fails on a duplicate id within either registry: id uniqueness is a
    /// store invariant the engine relies on and never attempts to repair.
    pub fn build(
        normalizer: &NameNormalizer,
        athletes: Vec<AthleteRecord>,
        foreign: Vec<ForeignAthleteRecord>,
        corrections: Vec<NationCorrection>,
    ) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for record in &athletes {
            if !seen.insert(record.id.get()) {
                return Err(StoreError::DuplicateAthleteId(record.id.get()));
            }
        }
        let mut seen = BTreeSet::new();
        for record in &foreign {
            if !seen.insert(record.id.get()) {
                return Err(StoreError::DuplicateForeignId(record.id.get()));
            }
        }

        // Index postings use the expanded token sets (nickname alternates
        // included) for recall; the entries served to the matcher carry the
        // canonical sets overlap is counted on.
        let mut athlete_names = Vec::new();
        let mut athlete_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (record_idx, record) in athletes.iter().enumerate() {
            let spellings = std::iter::once((record.full_name.as_str(), false))
                .chain(record.aliases.iter().map(|alias| (alias.as_str(), true)));
            for (spelling, alias) in spellings {
                let normalized = normalizer.normalize(spelling);
                if normalized.is_empty() {
                    continue;
                }
                let entry_idx = athlete_names.len();
                for token in normalized.tokens() {
                    athlete_index.entry(token.clone()).or_default().push(entry_idx);
                }
                athlete_names.push(AthleteNameEntry {
                    record_idx,
                    name: spelling.to_string(),
                    tokens: normalized.canonical_tokens().clone(),
                    alias,
                });
            }
        }

        let mut foreign_names = Vec::new();
        let mut foreign_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (record_idx, record) in foreign.iter().enumerate() {
            let normalized = normalizer.normalize(&record.full_name);
            if normalized.is_empty() {
                continue;
            }
            let entry_idx = foreign_names.len();
            for token in normalized.tokens() {
                foreign_index.entry(token.clone()).or_default().push(entry_idx);
            }
            foreign_names.push(ForeignNameEntry {
                record_idx,
                tokens: normalized.canonical_tokens().clone(),
            });
        }

        let corrections = corrections
            .into_iter()
            .map(|correction| {
                let key = normalizer
                    .normalize(&correction.full_name)
                    .canonical_tokens()
                    .clone();
                (key, correction)
            })
            .collect();

        let store = Self {
            athletes,
            foreign,
            corrections,
            athlete_names,
            foreign_names,
            athlete_index,
            foreign_index,
        };
        debug!(
            athletes = store.athletes.len(),
            foreign = store.foreign.len(),
            corrections = store.corrections.len(),
            indexed_spellings = store.athlete_names.len(),
            "registry store built"
        );
        Ok(store)
    }

    pub fn athlete_count(&self) -> usize {
        self.athletes.len()
    }

    pub fn foreign_count(&self) -> usize {
        self.foreign.len()
    }

    pub fn correction_count(&self) -> usize {
        self.corrections.len()
    }

    /// Entry indices sharing at least one query token, in index order.
    fn posting_union(index: &BTreeMap<String, Vec<usize>>, tokens: &BTreeSet<String>) -> BTreeSet<usize> {
        let mut hits = BTreeSet::new();
        for token in tokens {
            if let Some(postings) = index.get(token) {
                hits.extend(postings.iter().copied());
            }
        }
        hits
    }
}

impl IdentityStore for InMemoryStore {
    fn athletes_sharing_tokens(&self, tokens: &BTreeSet<String>) -> Vec<AthleteCandidate<'_>> {
        Self::posting_union(&self.athlete_index, tokens)
            .into_iter()
            .map(|entry_idx| {
                let entry = &self.athlete_names[entry_idx];
                AthleteCandidate {
                    record: &self.athletes[entry.record_idx],
                    name: &entry.name,
                    tokens: &entry.tokens,
                    alias_used: entry.alias,
                }
            })
            .collect()
    }

    fn foreign_sharing_tokens(&self, tokens: &BTreeSet<String>) -> Vec<ForeignCandidate<'_>> {
        Self::posting_union(&self.foreign_index, tokens)
            .into_iter()
            .map(|entry_idx| {
                let entry = &self.foreign_names[entry_idx];
                ForeignCandidate {
                    record: &self.foreign[entry.record_idx],
                    tokens: &entry.tokens,
                }
            })
            .collect()
    }

    fn correction_for(
        &self,
        tokens: &BTreeSet<String>,
        birthdate: Option<NaiveDate>,
    ) -> Option<&NationCorrection> {
        let applicable = self.corrections.iter().filter(|(key, correction)| {
            key == tokens
                && match correction.birthdate {
                    Some(pinned) => birthdate == Some(pinned),
                    None => true,
                }
        });
        // A correction pinned to this birthdate beats a generic one for the
        // same name; within each group the earliest-loaded entry wins.
        let mut generic = None;
        for (_, correction) in applicable {
            if correction.birthdate.is_some() {
                return Some(correction);
            }
            if generic.is_none() {
                generic = Some(correction);
            }
        }
        generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swimid_model::{AthleteId, CorrectionTarget, ForeignAthleteId, Gender, NationCode};

    fn nation(code: &str) -> NationCode {
        NationCode::new(code).unwrap()
    }

    fn athlete(id: u32, name: &str, aliases: &[&str]) -> AthleteRecord {
        AthleteRecord {
            id: AthleteId::new(id),
            full_name: name.to_string(),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
            birthdate: None,
            gender: Some(Gender::Male),
            nation: nation("MAS"),
            club: None,
        }
    }

    #[test]
    fn duplicate_athlete_id_is_rejected() {
        let normalizer = NameNormalizer::default();
        let result = InMemoryStore::build(
            &normalizer,
            vec![athlete(1, "Lim Wei Sheng", &[]), athlete(1, "Tan Jun Hao", &[])],
            Vec::new(),
            Vec::new(),
        );
        assert!(matches!(result, Err(StoreError::DuplicateAthleteId(1))));
    }

    #[test]
    fn aliases_are_indexed_separately() {
        let normalizer = NameNormalizer::default();
        let store = InMemoryStore::build(
            &normalizer,
            vec![athlete(1, "Teo Jun Hao", &["Teo Chun How"])],
            Vec::new(),
            Vec::new(),
        )
        .unwrap();

        let query = normalizer.normalize("Chun How");
        let hits = store.athletes_sharing_tokens(query.tokens());
        assert_eq!(hits.len(), 1);
        assert!(hits[0].alias_used);
        assert_eq!(hits[0].name, "Teo Chun How");

        let query = normalizer.normalize("Jun Hao");
        let hits = store.athletes_sharing_tokens(query.tokens());
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].alias_used);
    }

    #[test]
    fn no_shared_token_means_no_hits() {
        let normalizer = NameNormalizer::default();
        let store = InMemoryStore::build(
            &normalizer,
            vec![athlete(1, "Lim Wei Sheng", &[])],
            Vec::new(),
            Vec::new(),
        )
        .unwrap();
        let query = normalizer.normalize("Jane Doe");
        assert!(store.athletes_sharing_tokens(query.tokens()).is_empty());
        assert!(store.foreign_sharing_tokens(query.tokens()).is_empty());
    }

    #[test]
    fn pinned_correction_beats_generic() {
        let normalizer = NameNormalizer::default();
        let birthdate = NaiveDate::from_ymd_opt(2004, 6, 15).unwrap();
        let generic = NationCorrection {
            full_name: "LEE, Elson C".to_string(),
            birthdate: None,
            wrong_nation: Some(nation("USA")),
            corrected_nation: nation("MAS"),
            target: CorrectionTarget::Athlete(AthleteId::new(40)),
        };
        let pinned = NationCorrection {
            birthdate: Some(birthdate),
            target: CorrectionTarget::Athlete(AthleteId::new(41)),
            ..generic.clone()
        };
        let store = InMemoryStore::build(
            &normalizer,
            Vec::new(),
            Vec::new(),
            vec![generic, pinned],
        )
        .unwrap();

        let query = normalizer.normalize("Elson C Lee");
        let hit = store
            .correction_for(query.canonical_tokens(), Some(birthdate))
            .unwrap();
        assert_eq!(hit.target, CorrectionTarget::Athlete(AthleteId::new(41)));

        // Without the pinned birthdate only the generic correction applies.
        let hit = store.correction_for(query.canonical_tokens(), None).unwrap();
        assert_eq!(hit.target, CorrectionTarget::Athlete(AthleteId::new(40)));
    }

    #[test]
    fn foreign_registry_is_queried_independently() {
        let normalizer = NameNormalizer::default();
        let store = InMemoryStore::build(
            &normalizer,
            Vec::new(),
            vec![ForeignAthleteRecord {
                id: ForeignAthleteId::new(7),
                full_name: "Nattapong Srisawat".to_string(),
                birthdate: None,
                gender: None,
                nation: nation("THA"),
                club: None,
            }],
            Vec::new(),
        )
        .unwrap();
        let query = normalizer.normalize("Srisawat");
        let hits = store.foreign_sharing_tokens(query.tokens());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.id, ForeignAthleteId::new(7));
    }
}
