//! CSV files of event rows
//!
//! Header row plus one row per event. Quoting follows the usual CSV rules:
//! fields holding commas, quotes or line breaks are quoted, with inner
//! quotes doubled.

use anyhow::{Context, Result, anyhow, bail};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use daybook_core::record::{COLUMNS, EventRecord};
use std::path::Path;

/// Render rows as CSV text, header first
pub fn encode(records: &[EventRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record(&record.to_fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finish CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Parse CSV text produced by [`encode`] or a compatible spreadsheet export
pub fn decode(text: &str) -> Result<Vec<EventRecord>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = reader.headers().context("Failed to read CSV header")?;
    if header.is_empty() {
        bail!("CSV file is empty");
    }
    let matches_header = header.len() == COLUMNS.len()
        && header
            .iter()
            .zip(COLUMNS)
            .all(|(found, expected)| found.trim().eq_ignore_ascii_case(expected));
    if !matches_header {
        bail!("CSV header must be: {}", COLUMNS.join(","));
    }

    reader
        .records()
        .enumerate()
        .map(|(idx, row)| {
            let row = row.with_context(|| format!("Row {}", idx + 2))?;
            let line = row.position().map_or(idx as u64 + 2, |p| p.line());
            let found = row.len();
            let fields: [String; 9] = row
                .iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
                .try_into()
                .map_err(|_| {
                    anyhow!("Row {}: expected {} fields, found {}", line, COLUMNS.len(), found)
                })?;
            EventRecord::from_fields(&fields).with_context(|| format!("Row {}", line))
        })
        .collect()
}

pub fn write_file(path: &Path, records: &[EventRecord]) -> Result<()> {
    std::fs::write(path, encode(records)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn read_file(path: &Path) -> Result<Vec<EventRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    decode(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
