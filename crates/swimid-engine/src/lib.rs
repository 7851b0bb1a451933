//! `swimid-engine` — athlete identity resolution.
//!
//! Pure engine crate: receives one parsed result row at a time plus a
//! read-only store handle, and returns a structured match decision. No IO,
//! no persistence, no identity creation.

#![deny(unsafe_code)]

pub mod config;
pub mod matcher;
pub mod normalize;
pub mod resolver;
pub mod store;

pub use config::MatchThresholds;
pub use matcher::{CandidateMatcher, ScoredCandidate, birthdate_agreement, genders_agree};
pub use normalize::{NameNormalizer, NormalizedName, NormalizerConfig};
pub use resolver::Resolver;
pub use store::{AthleteCandidate, ForeignCandidate, IdentityStore};
