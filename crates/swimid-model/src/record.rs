//! Registry and result-row records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ids::{AthleteId, ForeignAthleteId, NationCode, RowId};

/// Recorded gender. Result files carry this unreliably, so it is optional
/// everywhere and an unrecognized value degrades to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Lenient parse of source-file gender tags. Never fails; anything
    /// unrecognized is reported as unknown.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "F" | "W" | "FEMALE" | "GIRL" | "WOMEN" => Some(Self::Female),
            "M" | "MALE" | "BOY" | "MEN" => Some(Self::Male),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "F",
            Self::Male => "M",
        }
    }
}

/// One row from an uploaded results file, after file parsing and before
/// identity resolution. Constructed once per row and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingRecord {
    pub full_name: String,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub nation: NationCode,
    pub club: Option<String>,
}

impl IncomingRecord {
    /// Deterministic identity for this row within its file.
    ///
    /// The sequence number is part of the digest so duplicate rows (the same
    /// swimmer entered twice) still get distinct ids.
    pub fn row_id(&self, seq: usize) -> RowId {
        let mut hasher = Sha256::new();
        hasher.update(seq.to_le_bytes());
        hasher.update(self.full_name.as_bytes());
        hasher.update([0u8]);
        if let Some(date) = self.birthdate {
            hasher.update(date.to_string().as_bytes());
        }
        hasher.update([0u8]);
        if let Some(gender) = self.gender {
            hasher.update(gender.as_str().as_bytes());
        }
        hasher.update([0u8]);
        hasher.update(self.nation.as_str().as_bytes());
        hasher.update([0u8]);
        if let Some(club) = &self.club {
            hasher.update(club.as_bytes());
        }
        RowId::from_first_16_bytes_of_sha256(hasher.finalize().into())
    }
}

/// A registered, federation-eligible athlete.
///
/// Aliases are alternative full-name spellings appended administratively as
/// review decisions confirm them; the resolution engine reads them but never
/// writes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteRecord {
    pub id: AthleteId,
    pub full_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub nation: NationCode,
    pub club: Option<String>,
}

/// A foreign competitor appearing in local results. Tracked in its own
/// registry with its own id sequence; foreign athletes do not accumulate
/// aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignAthleteRecord {
    pub id: ForeignAthleteId,
    pub full_name: String,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub nation: NationCode,
    pub club: Option<String>,
}

/// Which registry a nation correction resolves into.
///
/// A sum type rather than a table name plus bare integer, so a correction
/// physically cannot point a foreign id at the athlete column or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", content = "id", rename_all = "snake_case")]
pub enum CorrectionTarget {
    Athlete(AthleteId),
    Foreign(ForeignAthleteId),
}

/// A manually curated override for a name known to carry a wrong nationality
/// tag in result files.
///
/// Keyed by (full name, optional birthdate). Corrections are additive, never
/// expire, and are consulted only after both registries fail to produce a
/// confident match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationCorrection {
    pub full_name: String,
    pub birthdate: Option<NaiveDate>,
    /// The wrong code as it appears in result files. Informational; shown to
    /// reviewers but not part of the lookup key.
    pub wrong_nation: Option<NationCode>,
    pub corrected_nation: NationCode,
    pub target: CorrectionTarget,
}
