//! Subcommand implementations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use swimid_cli::ingest::load_results;
use swimid_engine::{MatchThresholds, NameNormalizer, Resolver};
use swimid_report::{ResolutionSummary, ResolvedRow, summarize};
use swimid_store::InMemoryStore;

use crate::cli::{ResolveArgs, ThresholdArg, TokensArgs};

/// Everything the summary printer needs after a batch run.
pub struct ResolveOutcome {
    pub source: String,
    pub summary: ResolutionSummary,
    pub output_dir: Option<PathBuf>,
    pub decisions_csv: Option<PathBuf>,
    pub review_report: Option<PathBuf>,
    pub unmatched_csv: Option<PathBuf>,
}

pub fn run_resolve(args: &ResolveArgs) -> Result<ResolveOutcome> {
    let normalizer = NameNormalizer::default();

    let athletes = swimid_store::csv::load_athletes(&args.athletes)?;
    let foreign = swimid_store::csv::load_foreign(&args.foreign)?;
    let corrections = match &args.corrections {
        Some(path) => swimid_store::csv::load_corrections(path)?,
        None => Vec::new(),
    };
    let store = InMemoryStore::build(&normalizer, athletes, foreign, corrections)?;

    let thresholds = match args.thresholds {
        ThresholdArg::Default => MatchThresholds::default(),
        ThresholdArg::Strict => MatchThresholds::strict(),
        ThresholdArg::Relaxed => MatchThresholds::relaxed(),
    };
    let resolver = Resolver::with_config(&store, normalizer.clone(), thresholds);

    let rows = load_results(&args.results)?;
    info!(
        rows = rows.len(),
        athletes = store.athlete_count(),
        foreign = store.foreign_count(),
        corrections = store.correction_count(),
        "starting batch resolution"
    );

    let progress = ProgressBar::new(rows.len() as u64).with_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} rows {msg}")
            .expect("progress template is valid"),
    );
    let mut resolved = Vec::with_capacity(rows.len());
    for (line, record) in rows {
        let decision = resolver.resolve(&record);
        resolved.push(ResolvedRow {
            row_id: record.row_id(line),
            line,
            record,
            decision,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary = summarize(&resolved);
    let source = args.results.display().to_string();

    if args.dry_run {
        return Ok(ResolveOutcome {
            source,
            summary,
            output_dir: None,
            decisions_csv: None,
            review_report: None,
            unmatched_csv: None,
        });
    }

    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        args.results
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("output")
    });
    let decisions_csv = swimid_report::write_decisions_csv(&output_dir, &resolved)
        .context("write decisions.csv")?;
    let review_report = swimid_report::write_review_report_json(&output_dir, &source, &resolved)
        .context("write review_report.json")?;
    let unmatched_csv = swimid_report::write_unmatched_csv(&output_dir, &resolved)
        .context("write unmatched.csv")?;

    Ok(ResolveOutcome {
        source,
        summary,
        output_dir: Some(output_dir),
        decisions_csv: Some(decisions_csv),
        review_report: Some(review_report),
        unmatched_csv: Some(unmatched_csv),
    })
}

pub fn run_tokens(args: &TokensArgs) -> Result<()> {
    let normalizer = NameNormalizer::default();
    let name = normalizer.normalize(&args.name);
    if name.is_empty() {
        println!("(no tokens)");
        return Ok(());
    }
    for token in name.tokens() {
        println!("{token}");
    }
    Ok(())
}
