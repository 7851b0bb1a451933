//! Registry CSV loading.
//!
//! Registries are curated data, so parsing is strict: a malformed date or id
//! in a registry file is a load error, unlike result-file rows which degrade
//! field-by-field at the ingest boundary.
//!
//! Expected headers:
//!
//! - athletes: `id,full_name,aliases,birthdate,gender,nation,club`
//!   (aliases `;`-separated, may be empty)
//! - foreign athletes: `id,full_name,birthdate,gender,nation,club`
//! - corrections: `full_name,birthdate,wrong_nation,corrected_nation,target_table,target_id`

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use swimid_model::{
    AthleteId, AthleteRecord, CorrectionTarget, ForeignAthleteId, ForeignAthleteRecord, Gender,
    NationCode, NationCorrection,
};

use crate::error::{Result, StoreError};

const REGISTRY_DATE_FORMAT: &str = "%Y-%m-%d";

struct RegistryReader {
    file: String,
    reader: csv::Reader<File>,
    headers: Vec<String>,
}

impl RegistryReader {
    fn open(path: &Path) -> Result<Self> {
        let file = path.display().to_string();
        let handle = File::open(path).map_err(|source| StoreError::Io {
            file: file.clone(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(handle);
        let headers = reader
            .headers()
            .map_err(|source| StoreError::Csv {
                file: file.clone(),
                source,
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Ok(Self {
            file,
            reader,
            headers,
        })
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| StoreError::MissingColumn {
                file: self.file.clone(),
                column: name.to_string(),
            })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }
}

fn field(record: &csv::StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

fn optional_field(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    let value = field(record, idx?);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_id(file: &str, row: usize, value: &str) -> Result<u32> {
    value.parse().map_err(|_| StoreError::InvalidId {
        file: file.to_string(),
        row,
        value: value.to_string(),
    })
}

fn parse_date(file: &str, row: usize, value: &str) -> Result<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, REGISTRY_DATE_FORMAT)
        .map(Some)
        .map_err(|_| StoreError::InvalidDate {
            file: file.to_string(),
            row,
            value: value.to_string(),
        })
}

fn parse_nation(file: &str, row: usize, value: &str) -> Result<NationCode> {
    NationCode::new(value).map_err(|_| StoreError::InvalidNation {
        file: file.to_string(),
        row,
        value: value.to_string(),
    })
}

/// Load the registered-athlete registry.
pub fn load_athletes(path: &Path) -> Result<Vec<AthleteRecord>> {
    let mut reader = RegistryReader::open(path)?;
    let id_idx = reader.column("id")?;
    let name_idx = reader.column("full_name")?;
    let aliases_idx = reader.optional_column("aliases");
    let birthdate_idx = reader.column("birthdate")?;
    let gender_idx = reader.column("gender")?;
    let nation_idx = reader.column("nation")?;
    let club_idx = reader.optional_column("club");

    let file = reader.file.clone();
    let mut records = Vec::new();
    for (row, result) in reader.reader.records().enumerate() {
        let record = result.map_err(|source| StoreError::Csv {
            file: file.clone(),
            source,
        })?;
        let row = row + 2; // 1-based, after the header line
        let aliases = optional_field(&record, aliases_idx)
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        records.push(AthleteRecord {
            id: AthleteId::new(parse_id(&file, row, field(&record, id_idx))?),
            full_name: field(&record, name_idx).to_string(),
            aliases,
            birthdate: parse_date(&file, row, field(&record, birthdate_idx))?,
            gender: Gender::parse_lenient(field(&record, gender_idx)),
            nation: parse_nation(&file, row, field(&record, nation_idx))?,
            club: optional_field(&record, club_idx),
        });
    }
    info!(file = %file, count = records.len(), "loaded athlete registry");
    Ok(records)
}

/// Load the foreign-athlete registry.
pub fn load_foreign(path: &Path) -> Result<Vec<ForeignAthleteRecord>> {
    let mut reader = RegistryReader::open(path)?;
    let id_idx = reader.column("id")?;
    let name_idx = reader.column("full_name")?;
    let birthdate_idx = reader.column("birthdate")?;
    let gender_idx = reader.column("gender")?;
    let nation_idx = reader.column("nation")?;
    let club_idx = reader.optional_column("club");

    let file = reader.file.clone();
    let mut records = Vec::new();
    for (row, result) in reader.reader.records().enumerate() {
        let record = result.map_err(|source| StoreError::Csv {
            file: file.clone(),
            source,
        })?;
        let row = row + 2;
        records.push(ForeignAthleteRecord {
            id: ForeignAthleteId::new(parse_id(&file, row, field(&record, id_idx))?),
            full_name: field(&record, name_idx).to_string(),
            birthdate: parse_date(&file, row, field(&record, birthdate_idx))?,
            gender: Gender::parse_lenient(field(&record, gender_idx)),
            nation: parse_nation(&file, row, field(&record, nation_idx))?,
            club: optional_field(&record, club_idx),
        });
    }
    info!(file = %file, count = records.len(), "loaded foreign registry");
    Ok(records)
}

/// Load the nation-correction table.
pub fn load_corrections(path: &Path) -> Result<Vec<NationCorrection>> {
    let mut reader = RegistryReader::open(path)?;
    let name_idx = reader.column("full_name")?;
    let birthdate_idx = reader.column("birthdate")?;
    let wrong_idx = reader.optional_column("wrong_nation");
    let corrected_idx = reader.column("corrected_nation")?;
    let table_idx = reader.column("target_table")?;
    let target_id_idx = reader.column("target_id")?;

    let file = reader.file.clone();
    let mut corrections = Vec::new();
    for (row, result) in reader.reader.records().enumerate() {
        let record = result.map_err(|source| StoreError::Csv {
            file: file.clone(),
            source,
        })?;
        let row = row + 2;
        let target_id = parse_id(&file, row, field(&record, target_id_idx))?;
        let target = match field(&record, table_idx).to_ascii_lowercase().as_str() {
            "athlete" => CorrectionTarget::Athlete(AthleteId::new(target_id)),
            "foreign" => CorrectionTarget::Foreign(ForeignAthleteId::new(target_id)),
            other => {
                return Err(StoreError::UnknownTargetTable {
                    file: file.clone(),
                    row,
                    value: other.to_string(),
                });
            }
        };
        let wrong_nation = match optional_field(&record, wrong_idx) {
            Some(value) => Some(parse_nation(&file, row, &value)?),
            None => None,
        };
        corrections.push(NationCorrection {
            full_name: field(&record, name_idx).to_string(),
            birthdate: parse_date(&file, row, field(&record, birthdate_idx))?,
            wrong_nation,
            corrected_nation: parse_nation(&file, row, field(&record, corrected_idx))?,
            target,
        });
    }
    info!(file = %file, count = corrections.len(), "loaded nation corrections");
    Ok(corrections)
}
