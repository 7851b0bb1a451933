//! A deliberately naive full-scan store for engine tests.
//!
//! The engine only requires that every record sharing at least one token
//! comes back; a linear scan is the degenerate but valid implementation.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use swimid_engine::normalize::NameNormalizer;
use swimid_engine::store::{AthleteCandidate, ForeignCandidate, IdentityStore};
use swimid_model::{
    AthleteId, AthleteRecord, ForeignAthleteId, ForeignAthleteRecord, NationCode, NationCorrection,
};

pub struct ScanStore {
    pub athletes: Vec<AthleteRecord>,
    pub foreign: Vec<ForeignAthleteRecord>,
    pub corrections: Vec<NationCorrection>,
    athlete_names: Vec<(usize, String, BTreeSet<String>, bool)>,
    foreign_names: Vec<(usize, BTreeSet<String>)>,
    correction_keys: Vec<BTreeSet<String>>,
}

impl ScanStore {
    pub fn new(
        athletes: Vec<AthleteRecord>,
        foreign: Vec<ForeignAthleteRecord>,
        corrections: Vec<NationCorrection>,
    ) -> Self {
        let normalizer = NameNormalizer::default();
        let mut athlete_names = Vec::new();
        for (idx, record) in athletes.iter().enumerate() {
            athlete_names.push((
                idx,
                record.full_name.clone(),
                normalizer.normalize(&record.full_name).canonical_tokens().clone(),
                false,
            ));
            for alias in &record.aliases {
                athlete_names.push((
                    idx,
                    alias.clone(),
                    normalizer.normalize(alias).canonical_tokens().clone(),
                    true,
                ));
            }
        }
        let foreign_names = foreign
            .iter()
            .enumerate()
            .map(|(idx, record)| (idx, normalizer.normalize(&record.full_name).canonical_tokens().clone()))
            .collect();
        let correction_keys = corrections
            .iter()
            .map(|c| normalizer.normalize(&c.full_name).canonical_tokens().clone())
            .collect();
        Self {
            athletes,
            foreign,
            corrections,
            athlete_names,
            foreign_names,
            correction_keys,
        }
    }
}

fn shares_token(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
    a.intersection(b).next().is_some()
}

impl IdentityStore for ScanStore {
    fn athletes_sharing_tokens(&self, tokens: &BTreeSet<String>) -> Vec<AthleteCandidate<'_>> {
        self.athlete_names
            .iter()
            .filter(|(_, _, name_tokens, _)| shares_token(tokens, name_tokens))
            .map(|(idx, name, name_tokens, alias)| AthleteCandidate {
                record: &self.athletes[*idx],
                name,
                tokens: name_tokens,
                alias_used: *alias,
            })
            .collect()
    }

    fn foreign_sharing_tokens(&self, tokens: &BTreeSet<String>) -> Vec<ForeignCandidate<'_>> {
        self.foreign_names
            .iter()
            .filter(|(_, name_tokens)| shares_token(tokens, name_tokens))
            .map(|(idx, name_tokens)| ForeignCandidate {
                record: &self.foreign[*idx],
                tokens: name_tokens,
            })
            .collect()
    }

    fn correction_for(
        &self,
        tokens: &BTreeSet<String>,
        birthdate: Option<NaiveDate>,
    ) -> Option<&NationCorrection> {
        self.corrections
            .iter()
            .zip(&self.correction_keys)
            .find(|(correction, key)| {
                *key == tokens
                    && match correction.birthdate {
                        Some(pinned) => birthdate == Some(pinned),
                        None => true,
                    }
            })
            .map(|(correction, _)| correction)
    }
}

pub fn nation(code: &str) -> NationCode {
    NationCode::new(code).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn athlete(id: u32, name: &str) -> AthleteRecord {
    AthleteRecord {
        id: AthleteId::new(id),
        full_name: name.to_string(),
        aliases: Vec::new(),
        birthdate: None,
        gender: None,
        nation: nation("MAS"),
        club: None,
    }
}

pub fn foreign(id: u32, name: &str, code: &str) -> ForeignAthleteRecord {
    ForeignAthleteRecord {
        id: ForeignAthleteId::new(id),
        full_name: name.to_string(),
        birthdate: None,
        gender: None,
        nation: nation(code),
        club: None,
    }
}
