//! The store seam: the query capability the engine consumes.
//!
//! The engine only ever reads. Indexing strategy belongs to the
//! implementation: an inverted token index and a full scan are both valid,
//! as long as every record sharing at least one token with the query comes
//! back. Queries arrive as expanded token sets (nickname alternates
//! included) for recall; candidates come back with canonical token sets for
//! counting. Both sets are produced by the same normalizer configuration the
//! engine resolves with, so tokenization cannot diverge between index and
//! matcher.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use swimid_model::{AthleteRecord, ForeignAthleteRecord, NationCorrection};

/// One name variant of a registered athlete, as returned by a token query.
///
/// A record with aliases yields one candidate per spelling; the matcher
/// keeps the best-scoring variant per record.
#[derive(Debug, Clone, Copy)]
pub struct AthleteCandidate<'a> {
    pub record: &'a AthleteRecord,
    /// The stored spelling this entry represents: the primary name, or one
    /// of the record's aliases.
    pub name: &'a str,
    /// Canonical tokens of `name` (nickname groups collapsed to one
    /// representative each).
    pub tokens: &'a BTreeSet<String>,
    /// True when `name` is an alias rather than the primary spelling.
    pub alias_used: bool,
}

/// A foreign-athlete candidate. Foreign records have no aliases, so there is
/// exactly one candidate per record.
#[derive(Debug, Clone, Copy)]
pub struct ForeignCandidate<'a> {
    pub record: &'a ForeignAthleteRecord,
    /// Canonical tokens of the record's name.
    pub tokens: &'a BTreeSet<String>,
}

/// Read-only query interface over the two registries and the correction
/// table. All methods are pure lookups; a batch resolution pass assumes the
/// store does not change underneath it.
pub trait IdentityStore {
    /// Every athlete name variant sharing at least one token with the query.
    fn athletes_sharing_tokens(&self, tokens: &BTreeSet<String>) -> Vec<AthleteCandidate<'_>>;

    /// Every foreign athlete sharing at least one token with the query.
    fn foreign_sharing_tokens(&self, tokens: &BTreeSet<String>) -> Vec<ForeignCandidate<'_>>;

    /// The nation correction keyed by this normalized name, if any.
    ///
    /// The key is equality of canonical token sets, so word order, case and
    /// nickname spelling never defeat a correction. A correction that pins a
    /// birthdate only applies when the incoming birthdate equals it exactly;
    /// a correction without one applies to any birthdate.
    fn correction_for(
        &self,
        tokens: &BTreeSet<String>,
        birthdate: Option<NaiveDate>,
    ) -> Option<&NationCorrection>;
}
