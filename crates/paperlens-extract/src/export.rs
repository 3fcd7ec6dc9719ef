//! Downloadable artifacts and a plain-text rendering of the record.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use paperlens_core::Result;

use crate::record::{ExtractionRecord, HeadingItem};

pub const EXTRACTION_FILE_NAME: &str = "paper_extraction.json";
pub const SUMMARY_FILE_NAME: &str = "paper_summary.txt";

const NOT_MENTIONED: &str = "Not mentioned";

/// Pretty-printed JSON of the record. Non-ASCII text is written as-is.
pub fn export_json(record: &ExtractionRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

pub fn summary_document(summary: &str) -> String {
    format!("PAPER SUMMARY\n{}\n\n{}", "=".repeat(50), summary)
}

/// Write both artifacts into `dir`, creating it if needed.
pub fn write_artifacts(dir: &Path, record: &ExtractionRecord, summary: &str) -> Result<[PathBuf; 2]> {
    std::fs::create_dir_all(dir)?;
    let json_path = dir.join(EXTRACTION_FILE_NAME);
    let summary_path = dir.join(SUMMARY_FILE_NAME);
    std::fs::write(&json_path, export_json(record)?)?;
    std::fs::write(&summary_path, summary_document(summary))?;
    Ok([json_path, summary_path])
}

/// Human-readable view of a record for the terminal.
pub fn render_text(record: &ExtractionRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Title:    {}", record.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(NOT_MENTIONED));
    let _ = writeln!(out, "Venue:    {}", record.venue.as_deref().filter(|v| !v.is_empty()).unwrap_or(NOT_MENTIONED));
    let _ = writeln!(
        out,
        "Year:     {}",
        record.year.map(|y| y.to_string()).unwrap_or_else(|| NOT_MENTIONED.into())
    );

    let mut names: Vec<&str> = Vec::new();
    for d in &record.datasets {
        if !d.name.is_empty() && !names.contains(&d.name.as_str()) {
            names.push(&d.name);
        }
    }
    let datasets = if names.is_empty() { NOT_MENTIONED.to_string() } else { names.join(", ") };
    let _ = writeln!(out, "Datasets: {}", datasets);

    render_section(&mut out, "Limitations Addressed", &record.limitations_addressed);
    render_section(&mut out, "Contributions", &record.contributions);
    render_section(&mut out, "Methods", &record.methods);
    render_section(&mut out, "Paper Limitations", &record.paper_limitations);

    if !record.evidence.is_empty() {
        let _ = writeln!(out, "\nSupporting Evidence");
        for e in &record.evidence {
            let page = e.page.map(|p| p.to_string()).unwrap_or_else(|| "?".into());
            let _ = writeln!(out, "  [p. {}] \"{}\"", page, e.quote);
        }
    }

    out
}

fn render_section(out: &mut String, title: &str, items: &[HeadingItem]) {
    let _ = writeln!(out, "\n{}", title);
    if items.is_empty() {
        let _ = writeln!(out, "  {}", NOT_MENTIONED);
        return;
    }
    for item in items {
        let heading = item.heading.trim();
        let explanation = item.explanation.trim();
        match (heading.is_empty(), explanation.is_empty()) {
            (false, false) => {
                let _ = writeln!(out, "  - {}: {}", heading, explanation);
            }
            (true, false) => {
                let _ = writeln!(out, "  - {}", explanation);
            }
            _ => {
                let _ = writeln!(out, "  - {}", heading);
            }
        }
        if let (Some(page), false) = (item.page, item.quote.is_empty()) {
            let _ = writeln!(out, "    [p. {}] \"{}\"", page, item.quote);
        }
    }
}
