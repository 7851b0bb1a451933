pub mod decision;
pub mod error;
pub mod ids;
pub mod record;

pub use decision::{
    BirthdateAgreement, CandidateDiagnostic, CandidateFate, CorrectionNote, DecisionTrail,
    MatchDecision, MatchOutcome, ResolutionStage,
};
pub use error::{ModelError, Result};
pub use ids::{AthleteId, ForeignAthleteId, NationCode, RegistryId, RowId};
pub use record::{
    AthleteRecord, CorrectionTarget, ForeignAthleteRecord, Gender, IncomingRecord,
    NationCorrection,
};
