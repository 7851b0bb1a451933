//! End-to-end batch pipeline: registry CSVs in, reports out.

use std::fs;
use std::path::Path;

use swimid_cli::ingest::load_results;
use swimid_engine::{NameNormalizer, Resolver};
use swimid_report::{ResolvedRow, summarize};
use swimid_store::InMemoryStore;

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("athletes.csv"),
        "id,full_name,aliases,birthdate,gender,nation,club\n\
         31,Muhd Dhuha bin Zulfikry,,2008-07-03,M,MAS,Selangor Aquatics\n\
         12,Teo Jun Hao,Teo Chun How,2006-02-11,M,MAS,Ikan Bilis SC\n\
         40,Lee Chen Wei,,2004-06-15,M,MAS,\n",
    );
    write(
        &dir.path().join("foreign.csv"),
        "id,full_name,birthdate,gender,nation,club\n\
         7,Nattapong Srisawat Chaiyo,2005-11-30,M,THA,Bangkok Dolphins\n",
    );
    write(
        &dir.path().join("corrections.csv"),
        "full_name,birthdate,wrong_nation,corrected_nation,target_table,target_id\n\
         \"LEE, Elson C\",2004-06-15,USA,MAS,athlete,40\n",
    );
    write(
        &dir.path().join("results.csv"),
        "full_name,birthdate,gender,nation,club\n\
         Dhuha bin Zulfikry,2008-03-07,M,MAS,Selangor Aquatics\n\
         Chun How Teo,2006-02-11,M,MAS,\n\
         Srisawat Nattapong Chaiyo,30/11/2005,M,THA,\n\
         \"LEE, Elson C\",2004-06-15,M,USA,\n\
         Jane Doe,,,,\n",
    );
    dir
}

fn resolve_fixture(dir: &Path) -> Vec<ResolvedRow> {
    let normalizer = NameNormalizer::default();
    let athletes = swimid_store::csv::load_athletes(&dir.join("athletes.csv")).unwrap();
    let foreign = swimid_store::csv::load_foreign(&dir.join("foreign.csv")).unwrap();
    let corrections = swimid_store::csv::load_corrections(&dir.join("corrections.csv")).unwrap();
    let store = InMemoryStore::build(&normalizer, athletes, foreign, corrections).unwrap();
    let resolver = Resolver::new(&store);

    load_results(&dir.join("results.csv"))
        .unwrap()
        .into_iter()
        .map(|(line, record)| {
            let decision = resolver.resolve(&record);
            ResolvedRow {
                row_id: record.row_id(line),
                line,
                record,
                decision,
            }
        })
        .collect()
}

#[test]
fn batch_resolves_every_row_kind() {
    let dir = fixture_dir();
    let rows = resolve_fixture(dir.path());
    let summary = summarize(&rows);

    assert_eq!(summary.total, 5);
    // Swap-suspect birthdate + alias matches resolve in the athlete
    // registry; the correction adds a third athlete match flagged for
    // review.
    assert_eq!(summary.matched_athletes, 3);
    assert_eq!(summary.matched_foreign, 1);
    assert_eq!(summary.correction_matches, 1);
    assert_eq!(summary.unmatched, 1);
    // The correction match and the unmatched row both need review.
    assert_eq!(summary.needs_review, 2);

    // The correction row resolved to the registry nation, not the file's.
    let lee = rows.iter().find(|r| r.record.full_name.contains("LEE")).unwrap();
    assert_eq!(
        lee.decision.resolved_nation().map(|n| n.as_str()),
        Some("MAS")
    );
    assert!(lee.decision.needs_review);
}

#[test]
fn reports_are_written_and_consistent() {
    let dir = fixture_dir();
    let rows = resolve_fixture(dir.path());
    let out = dir.path().join("output");

    let decisions = swimid_report::write_decisions_csv(&out, &rows).unwrap();
    let review = swimid_report::write_review_report_json(&out, "results.csv", &rows).unwrap();
    let unmatched = swimid_report::write_unmatched_csv(&out, &rows).unwrap();

    let decisions = fs::read_to_string(decisions).unwrap();
    assert_eq!(decisions.lines().count(), 6); // header + 5 rows
    assert!(decisions.contains("matched_foreign"));

    let review: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(review).unwrap()).unwrap();
    assert_eq!(review["summary"]["needs_review"], 2);
    assert_eq!(review["entries"].as_array().unwrap().len(), 2);

    let unmatched = fs::read_to_string(unmatched).unwrap();
    assert_eq!(unmatched.lines().count(), 2); // header + Jane Doe
    assert!(unmatched.contains("Jane Doe"));
}

#[test]
fn rerun_is_bit_identical_apart_from_timestamps() {
    let dir = fixture_dir();
    let first = resolve_fixture(dir.path());
    let second = resolve_fixture(dir.path());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.row_id, b.row_id);
        assert_eq!(a.decision, b.decision);
    }
}
