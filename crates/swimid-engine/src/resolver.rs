//! Resolution orchestration.
//!
//! Four stages in strict order: athlete registry, foreign registry, nation
//! corrections, needs-review. The first confident result wins. A stage is
//! confident only when exactly one top-ranked eligible candidate exists; two
//! candidates tied on every ranking key escalate to the next stage rather
//! than being split by id. The resolver never writes to any store: an
//! unresolved row surfaces for human review, it never becomes a new identity.

use tracing::debug;

use swimid_model::{
    CandidateDiagnostic, CandidateFate, CorrectionNote, CorrectionTarget, DecisionTrail,
    IncomingRecord, MatchDecision, MatchOutcome, ResolutionStage,
};

use crate::config::MatchThresholds;
use crate::matcher::{CandidateMatcher, ScoredCandidate};
use crate::normalize::NameNormalizer;
use crate::store::IdentityStore;

/// Candidates kept per registry in a diagnostic trail. Anything beyond this
/// is noise to a reviewer.
const MAX_TRAIL_CANDIDATES: usize = 8;

/// The identity resolution engine. Pure: one [`resolve`](Resolver::resolve)
/// call is a read over the store plus the single incoming record, so a batch
/// pass may run many calls concurrently against a shared resolver.
#[derive(Debug)]
pub struct Resolver<'a, S> {
    store: &'a S,
    normalizer: NameNormalizer,
    matcher: CandidateMatcher,
}

impl<'a, S: IdentityStore> Resolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::with_config(store, NameNormalizer::default(), MatchThresholds::default())
    }

    pub fn with_config(
        store: &'a S,
        normalizer: NameNormalizer,
        thresholds: MatchThresholds,
    ) -> Self {
        Self {
            store,
            normalizer,
            matcher: CandidateMatcher::new(thresholds),
        }
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    /// Resolve one incoming record to a decision.
    ///
    /// Never fails on well-formed input: unparseable birthdates and unknown
    /// genders have already degraded to `None`, which only weakens the
    /// evidence available, and every uncertain path ends in `NeedsReview`.
    pub fn resolve(&self, record: &IncomingRecord) -> MatchDecision {
        let name = self.normalizer.normalize(&record.full_name);

        // Stage 1: registered athletes, aliases included.
        let athlete_hits = self.store.athletes_sharing_tokens(name.tokens());
        let ranked =
            self.matcher
                .rank_athletes(&name, record.birthdate, record.gender, &athlete_hits);
        let (winner, athlete_diags) = decide_stage(ranked);
        if let Some(winner) = winner {
            debug!(row = %record.full_name, candidate = %winner.reference, "matched in athlete registry");
            return decision_for_winner(
                winner,
                ResolutionStage::AthleteRegistry,
                name.tokens().clone(),
                athlete_diags,
                Vec::new(),
            );
        }

        // Stage 2: foreign competitors.
        let foreign_hits = self.store.foreign_sharing_tokens(name.tokens());
        let ranked =
            self.matcher
                .rank_foreign(&name, record.birthdate, record.gender, &foreign_hits);
        let (winner, foreign_diags) = decide_stage(ranked);
        if let Some(winner) = winner {
            debug!(row = %record.full_name, candidate = %winner.reference, "matched in foreign registry");
            return decision_for_winner(
                winner,
                ResolutionStage::ForeignRegistry,
                name.tokens().clone(),
                athlete_diags,
                foreign_diags,
            );
        }

        // Stage 3: curated nation corrections. Keyed on canonical word sets
        // so a spelling variant still hits its correction. A hit is a strong
        // hint, not a certainty, so it always surfaces for confirmation.
        if let Some(correction) = self
            .store
            .correction_for(name.canonical_tokens(), record.birthdate)
        {
            debug!(row = %record.full_name, target = ?correction.target, "nation correction applied");
            let outcome = match correction.target {
                CorrectionTarget::Athlete(id) => MatchOutcome::Athlete {
                    id,
                    nation: correction.corrected_nation.clone(),
                },
                CorrectionTarget::Foreign(id) => MatchOutcome::Foreign {
                    id,
                    nation: correction.corrected_nation.clone(),
                },
            };
            return MatchDecision {
                outcome,
                needs_review: true,
                trail: DecisionTrail {
                    tokens: name.tokens().clone(),
                    stage: ResolutionStage::NationCorrection,
                    athlete_candidates: athlete_diags,
                    foreign_candidates: foreign_diags,
                    correction: Some(CorrectionNote {
                        corrected_nation: correction.corrected_nation.clone(),
                        wrong_nation: correction.wrong_nation.clone(),
                        target: correction.target,
                    }),
                },
            };
        }

        // Terminal: nothing confident anywhere. No identity is ever created
        // here; the trail carries what a reviewer needs.
        debug!(row = %record.full_name, "no confident match, queued for review");
        MatchDecision {
            outcome: MatchOutcome::NeedsReview,
            needs_review: true,
            trail: DecisionTrail {
                tokens: name.tokens().clone(),
                stage: ResolutionStage::Unresolved,
                athlete_candidates: athlete_diags,
                foreign_candidates: foreign_diags,
                correction: None,
            },
        }
    }
}

/// Pick the stage winner, if any, and classify every scored candidate for
/// the trail.
///
/// A winner exists when the best eligible candidate is not tied with the
/// next eligible candidate on all three ranking keys. Ties at the top are
/// escalated, never broken by id.
fn decide_stage(
    ranked: Vec<ScoredCandidate>,
) -> (Option<ScoredCandidate>, Vec<CandidateDiagnostic>) {
    let top_key = ranked
        .iter()
        .find(|c| c.eligible)
        .map(ScoredCandidate::rank_key);
    let tied = top_key.is_some_and(|key| {
        ranked
            .iter()
            .filter(|c| c.eligible && c.rank_key() == key)
            .count()
            > 1
    });

    let mut winner: Option<ScoredCandidate> = None;
    let mut diags = Vec::new();
    for candidate in ranked {
        let fate = if !candidate.eligible {
            CandidateFate::BelowThreshold
        } else if tied && Some(candidate.rank_key()) == top_key {
            CandidateFate::TiedAtTop
        } else if !tied && winner.is_none() {
            winner = Some(candidate.clone());
            CandidateFate::TopMatch
        } else {
            CandidateFate::Outranked
        };
        if diags.len() < MAX_TRAIL_CANDIDATES {
            diags.push(candidate.into_diagnostic(fate));
        }
    }
    (winner, diags)
}

fn decision_for_winner(
    winner: ScoredCandidate,
    stage: ResolutionStage,
    tokens: std::collections::BTreeSet<String>,
    athlete_candidates: Vec<CandidateDiagnostic>,
    foreign_candidates: Vec<CandidateDiagnostic>,
) -> MatchDecision {
    MatchDecision {
        outcome: winner.into_outcome(),
        needs_review: false,
        trail: DecisionTrail {
            tokens,
            stage,
            athlete_candidates,
            foreign_candidates,
            correction: None,
        },
    }
}
