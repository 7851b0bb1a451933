//! `swimid-report`: human- and machine-facing outputs of a batch
//! resolution pass.
//!
//! Three artifacts per run:
//!
//! - `decisions.csv`: one line per input row with the resolved id columns.
//!   `athlete_id` and `foreign_athlete_id` are separate columns and never
//!   both set; the decision type makes the alternative unrepresentable.
//! - `review_report.json`: versioned payload carrying the full diagnostic
//!   trail for every row a human must confirm.
//! - `unmatched.csv`: the flat worklist of rows with no match at all.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use swimid_model::{
    CandidateDiagnostic, IncomingRecord, MatchDecision, MatchOutcome, ResolutionStage, RowId,
};

const REPORT_SCHEMA: &str = "swimid.review-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

/// One fully resolved input row, as produced by the batch caller.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRow {
    pub row_id: RowId,
    /// 1-based line number in the source file, for human cross-reference.
    pub line: usize,
    pub record: IncomingRecord,
    pub decision: MatchDecision,
}

/// Aggregate counts over a batch, consumed by the CLI summary table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    pub total: usize,
    pub matched_athletes: usize,
    pub matched_foreign: usize,
    /// Matches produced by the correction stage; a subset of the matched
    /// counts, always flagged for review.
    pub correction_matches: usize,
    pub needs_review: usize,
    pub unmatched: usize,
}

pub fn summarize(rows: &[ResolvedRow]) -> ResolutionSummary {
    let mut summary = ResolutionSummary {
        total: rows.len(),
        ..ResolutionSummary::default()
    };
    for row in rows {
        match row.decision.outcome {
            MatchOutcome::Athlete { .. } => summary.matched_athletes += 1,
            MatchOutcome::Foreign { .. } => summary.matched_foreign += 1,
            MatchOutcome::NeedsReview => summary.unmatched += 1,
        }
        if row.decision.trail.stage == ResolutionStage::NationCorrection {
            summary.correction_matches += 1;
        }
        if row.decision.needs_review {
            summary.needs_review += 1;
        }
    }
    summary
}

/// Write `decisions.csv` into `output_dir`.
pub fn write_decisions_csv(output_dir: &Path, rows: &[ResolvedRow]) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("decisions.csv");
    let mut writer = csv::Writer::from_path(&output_path)?;
    writer.write_record([
        "row_id",
        "line",
        "full_name",
        "outcome",
        "athlete_id",
        "foreign_athlete_id",
        "nation",
        "stage",
        "needs_review",
    ])?;
    for row in rows {
        let (outcome, athlete_id, foreign_id, nation) = match &row.decision.outcome {
            MatchOutcome::Athlete { id, nation } => {
                ("matched_athlete", id.to_string(), String::new(), nation.to_string())
            }
            MatchOutcome::Foreign { id, nation } => {
                ("matched_foreign", String::new(), id.to_string(), nation.to_string())
            }
            MatchOutcome::NeedsReview => {
                ("needs_review", String::new(), String::new(), String::new())
            }
        };
        writer.write_record([
            row.row_id.to_hex().as_str(),
            row.line.to_string().as_str(),
            row.record.full_name.as_str(),
            outcome,
            athlete_id.as_str(),
            foreign_id.as_str(),
            nation.as_str(),
            row.decision.trail.stage.to_string().as_str(),
            if row.decision.needs_review { "true" } else { "false" },
        ])?;
    }
    writer.flush()?;
    Ok(output_path)
}

#[derive(Debug, Serialize)]
struct ReviewReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    source: &'a str,
    summary: ResolutionSummary,
    entries: Vec<&'a ResolvedRow>,
}

/// Write `review_report.json` into `output_dir`: every row flagged for
/// review, with its full diagnostic trail.
pub fn write_review_report_json(
    output_dir: &Path,
    source: &str,
    rows: &[ResolvedRow],
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("review_report.json");
    let payload = ReviewReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        source,
        summary: summarize(rows),
        entries: rows.iter().filter(|row| row.decision.needs_review).collect(),
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&output_path, format!("{json}\n"))?;
    Ok(output_path)
}

/// Write `unmatched.csv` into `output_dir`: the worklist of rows with no
/// match anywhere, one line per row with its best near-miss per registry.
pub fn write_unmatched_csv(output_dir: &Path, rows: &[ResolvedRow]) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("unmatched.csv");
    let mut writer = csv::Writer::from_path(&output_path)?;
    writer.write_record([
        "row_id",
        "line",
        "full_name",
        "tokens",
        "best_athlete_candidate",
        "best_athlete_detail",
        "best_foreign_candidate",
        "best_foreign_detail",
    ])?;
    for row in rows {
        if row.decision.is_matched() {
            continue;
        }
        let tokens = row
            .decision
            .trail
            .tokens
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        let (athlete_name, athlete_detail) =
            best_candidate_columns(&row.decision.trail.athlete_candidates);
        let (foreign_name, foreign_detail) =
            best_candidate_columns(&row.decision.trail.foreign_candidates);
        writer.write_record([
            row.row_id.to_hex().as_str(),
            row.line.to_string().as_str(),
            row.record.full_name.as_str(),
            tokens.as_str(),
            athlete_name.as_str(),
            athlete_detail.as_str(),
            foreign_name.as_str(),
            foreign_detail.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(output_path)
}

/// The trail is ranked best-first, so the first candidate is the near-miss
/// worth showing a reviewer.
fn best_candidate_columns(candidates: &[CandidateDiagnostic]) -> (String, String) {
    match candidates.first() {
        None => (String::new(), String::new()),
        Some(best) => (
            format!("{} ({})", best.matched_name, best.reference),
            format!(
                "overlap={} birthdate={:?} gender_ok={} similarity={:.2} fate={:?}",
                best.overlap,
                best.birthdate,
                best.gender_agrees,
                best.name_similarity,
                best.fate
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use swimid_model::{AthleteId, DecisionTrail, Gender, NationCode};

    fn record(name: &str) -> IncomingRecord {
        IncomingRecord {
            full_name: name.to_string(),
            birthdate: None,
            gender: Some(Gender::Female),
            nation: NationCode::new("MAS").unwrap(),
            club: None,
        }
    }

    fn matched_row(line: usize, name: &str) -> ResolvedRow {
        let record = record(name);
        ResolvedRow {
            row_id: record.row_id(line),
            line,
            decision: MatchDecision {
                outcome: MatchOutcome::Athlete {
                    id: AthleteId::new(line as u32),
                    nation: NationCode::new("MAS").unwrap(),
                },
                needs_review: false,
                trail: DecisionTrail {
                    tokens: BTreeSet::new(),
                    stage: ResolutionStage::AthleteRegistry,
                    athlete_candidates: Vec::new(),
                    foreign_candidates: Vec::new(),
                    correction: None,
                },
            },
            record,
        }
    }

    fn unresolved_row(line: usize, name: &str) -> ResolvedRow {
        let record = record(name);
        ResolvedRow {
            row_id: record.row_id(line),
            line,
            decision: MatchDecision {
                outcome: MatchOutcome::NeedsReview,
                needs_review: true,
                trail: DecisionTrail {
                    tokens: BTreeSet::from(["doe".to_string(), "jane".to_string()]),
                    stage: ResolutionStage::Unresolved,
                    athlete_candidates: Vec::new(),
                    foreign_candidates: Vec::new(),
                    correction: None,
                },
            },
            record,
        }
    }

    #[test]
    fn summary_counts_outcomes() {
        let rows = vec![
            matched_row(1, "A B C"),
            matched_row(2, "D E F"),
            unresolved_row(3, "Jane Doe"),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.matched_athletes, 2);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.needs_review, 1);
    }

    #[test]
    fn decisions_csv_keeps_id_columns_disjoint() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![matched_row(1, "A B C"), unresolved_row(2, "Jane Doe")];
        let path = write_decisions_csv(dir.path(), &rows).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("athlete_id,foreign_athlete_id"));
        let matched = lines.next().unwrap();
        let fields: Vec<&str> = matched.split(',').collect();
        assert_eq!(fields[3], "matched_athlete");
        assert_eq!(fields[4], "1");
        assert_eq!(fields[5], "");
        let unresolved = lines.next().unwrap();
        assert!(unresolved.contains("needs_review"));
    }

    #[test]
    fn review_report_contains_only_flagged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![matched_row(1, "A B C"), unresolved_row(2, "Jane Doe")];
        let path = write_review_report_json(dir.path(), "meet.csv", &rows).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["schema"], "swimid.review-report");
        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["source"], "meet.csv");
        assert_eq!(json["entries"].as_array().unwrap().len(), 1);
        assert_eq!(json["entries"][0]["record"]["full_name"], "Jane Doe");
    }

    #[test]
    fn unmatched_csv_lists_unresolved_rows_with_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![matched_row(1, "A B C"), unresolved_row(2, "Jane Doe")];
        let path = write_unmatched_csv(dir.path(), &rows).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 2); // header + one row
        assert!(contents.contains("Jane Doe"));
        assert!(contents.contains("doe jane"));
    }
}
