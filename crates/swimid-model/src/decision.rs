//! Resolution decisions and their diagnostic trails.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{AthleteId, ForeignAthleteId, NationCode, RegistryId};
use crate::record::CorrectionTarget;

/// Which stage of the resolution pipeline produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStage {
    AthleteRegistry,
    ForeignRegistry,
    NationCorrection,
    Unresolved,
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AthleteRegistry => write!(f, "athlete_registry"),
            Self::ForeignRegistry => write!(f, "foreign_registry"),
            Self::NationCorrection => write!(f, "nation_correction"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// How a candidate's stored birthdate relates to the incoming one.
///
/// `DayMonthSwapped` marks a transposed-date match: the stored and incoming
/// dates agree once day and month are exchanged. It satisfies the matcher's
/// "birthdate matches" threshold arm but ranks below a true exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthdateAgreement {
    Exact,
    DayMonthSwapped,
    Mismatch,
    Unknown,
}

impl BirthdateAgreement {
    /// Ranking ordinal: exact beats swap-suspect beats everything else.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Exact => 2,
            Self::DayMonthSwapped => 1,
            Self::Mismatch | Self::Unknown => 0,
        }
    }

    /// True when the agreement counts as "birthdate matches" for the
    /// eligibility thresholds.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Exact | Self::DayMonthSwapped)
    }
}

/// What became of a scored candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateFate {
    /// The single confident winner of its stage.
    TopMatch,
    /// Eligible, but ranked strictly below the top candidate.
    Outranked,
    /// Tied with another candidate on every ranking key; escalated.
    TiedAtTop,
    /// Shared tokens but failed every eligibility threshold.
    BelowThreshold,
}

/// One scored registry candidate, kept for human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDiagnostic {
    pub reference: RegistryId,
    /// Stored name the score was computed against (primary name or alias).
    pub matched_name: String,
    /// Set when the best-scoring name for an athlete was one of its aliases.
    pub alias_used: Option<String>,
    /// Shared multi-character tokens; the primary ranking key.
    pub overlap: usize,
    /// Shared single-character tokens. Not counted toward thresholds or
    /// ranking, recorded for reviewers.
    pub initials_matched: usize,
    pub birthdate: BirthdateAgreement,
    pub gender_agrees: bool,
    /// Whole-name similarity ratio for triage display; plays no part in
    /// ranking.
    pub name_similarity: f64,
    pub fate: CandidateFate,
}

/// Note attached when a nation correction decided the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionNote {
    pub corrected_nation: NationCode,
    pub wrong_nation: Option<NationCode>,
    pub target: CorrectionTarget,
}

/// Full diagnostic trail for one resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTrail {
    /// Normalized tokens of the incoming name, initials included.
    pub tokens: BTreeSet<String>,
    pub stage: ResolutionStage,
    pub athlete_candidates: Vec<CandidateDiagnostic>,
    pub foreign_candidates: Vec<CandidateDiagnostic>,
    pub correction: Option<CorrectionNote>,
}

/// The outcome of resolving one incoming record.
///
/// A tagged union: a matched athlete id and a matched foreign id cannot
/// coexist, and `NeedsReview` carries no id at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Athlete { id: AthleteId, nation: NationCode },
    Foreign { id: ForeignAthleteId, nation: NationCode },
    NeedsReview,
}

/// Engine output for one row. Never persisted by the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDecision {
    #[serde(flatten)]
    pub outcome: MatchOutcome,
    /// True when a human should confirm before any database write: always
    /// for `NeedsReview`, and for correction-stage matches, which are a
    /// strong hint rather than a certainty.
    pub needs_review: bool,
    pub trail: DecisionTrail,
}

impl MatchDecision {
    pub fn is_matched(&self) -> bool {
        !matches!(self.outcome, MatchOutcome::NeedsReview)
    }

    pub fn athlete_id(&self) -> Option<AthleteId> {
        match self.outcome {
            MatchOutcome::Athlete { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn foreign_athlete_id(&self) -> Option<ForeignAthleteId> {
        match self.outcome {
            MatchOutcome::Foreign { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Nation code the decision settled on, always from the stored record or
    /// correction, never from the incoming row.
    pub fn resolved_nation(&self) -> Option<&NationCode> {
        match &self.outcome {
            MatchOutcome::Athlete { nation, .. } | MatchOutcome::Foreign { nation, .. } => {
                Some(nation)
            }
            MatchOutcome::NeedsReview => None,
        }
    }
}
