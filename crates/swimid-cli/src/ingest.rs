//! Lenient ingest of result-file rows.
//!
//! Result files come from meet management software of varying quality, so
//! this is the opposite of registry loading: per-field degradation instead
//! of errors. A birthdate that parses under no known format becomes unknown,
//! an unrecognized gender tag becomes unknown, and a missing nation tag is
//! recorded as the `UNK` placeholder (and logged); the engine never trusts
//! the incoming nation anyway. Only a structurally unreadable file or a
//! missing name column is an error.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::warn;

use swimid_model::{Gender, IncomingRecord, NationCode};

/// Date formats seen in the wild across meet exports.
const RESULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"];

/// Placeholder for rows that carry no nation tag at all.
const UNKNOWN_NATION: &str = "UNK";

/// Load result rows with their 1-based source line numbers.
pub fn load_results(path: &Path) -> Result<Vec<(usize, IncomingRecord)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open results file {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read header of {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let column = |names: &[&str]| -> Option<usize> {
        names
            .iter()
            .find_map(|name| headers.iter().position(|h| h == name))
    };

    let name_idx = column(&["full_name", "name", "athlete"])
        .with_context(|| format!("{}: no full_name column", path.display()))?;
    let birthdate_idx = column(&["birthdate", "dob", "birth_date"]);
    let gender_idx = column(&["gender", "sex"]);
    let nation_idx = column(&["nation", "nation_code", "country"]);
    let club_idx = column(&["club", "team"]);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2; // 1-based, after the header line
        let record = result.with_context(|| format!("{} line {line}", path.display()))?;
        let get = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::trim);

        let full_name = get(Some(name_idx)).unwrap_or("").to_string();

        let birthdate = get(birthdate_idx).and_then(|raw| parse_result_date(raw, line));
        let gender = get(gender_idx).and_then(Gender::parse_lenient);

        let nation = match get(nation_idx).filter(|raw| !raw.is_empty()) {
            Some(raw) => NationCode::new(raw).unwrap_or_else(|_| {
                warn!(line, value = raw, "unusable nation tag, recording as UNK");
                NationCode::new(UNKNOWN_NATION).expect("placeholder nation is valid")
            }),
            None => {
                warn!(line, "row carries no nation tag, recording as UNK");
                NationCode::new(UNKNOWN_NATION).expect("placeholder nation is valid")
            }
        };

        let club = get(club_idx)
            .filter(|raw| !raw.is_empty())
            .map(String::from);

        rows.push((
            line,
            IncomingRecord {
                full_name,
                birthdate,
                gender,
                nation,
                club,
            },
        ));
    }
    Ok(rows)
}

fn parse_result_date(raw: &str, line: usize) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    for format in RESULT_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    warn!(line, value = raw, "unparseable birthdate, treating as unknown");
    None
}
