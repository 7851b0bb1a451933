//! Terminal summary table for a batch run.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::commands::ResolveOutcome;

pub fn print_summary(outcome: &ResolveOutcome) {
    println!("Results: {}", outcome.source);
    if let Some(dir) = &outcome.output_dir {
        println!("Output: {}", dir.display());
    }
    if let Some(path) = &outcome.decisions_csv {
        println!("Decisions: {}", path.display());
    }
    if let Some(path) = &outcome.unmatched_csv {
        println!("Unmatched: {}", path.display());
    }

    let summary = &outcome.summary;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![header_cell("Outcome"), header_cell("Rows")]);

    table.add_row(vec![
        Cell::new("Matched athletes"),
        count_cell(summary.matched_athletes, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Matched foreign"),
        count_cell(summary.matched_foreign, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Via nation correction"),
        count_cell(summary.correction_matches, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Unmatched"),
        count_cell(summary.unmatched, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Needs review").add_attribute(Attribute::Bold),
        count_cell(summary.needs_review, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(summary.total)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if summary.needs_review > 0 {
        if let Some(path) = &outcome.review_report {
            println!(
                "{} row(s) need review, see {}",
                summary.needs_review,
                path.display()
            );
        } else {
            println!("{} row(s) need review (dry run)", summary.needs_review);
        }
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, nonzero_color: Color) -> Cell {
    let cell = Cell::new(count).set_alignment(CellAlignment::Right);
    if count > 0 { cell.fg(nonzero_color) } else { cell }
}
