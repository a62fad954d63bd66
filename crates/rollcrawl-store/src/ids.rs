use std::path::Path;

use rollcrawl_core::error::CrawlError;
use rollcrawl_core::models::FormatOptions;

/// Reads the ID column of a DSV file.
///
/// Rows whose ID field is missing, non-numeric or negative are skipped, as
/// are rows too short to have the column. Rows may have differing lengths.
pub fn read_ids(
    path: &Path,
    format: &FormatOptions,
    column: usize,
    has_headers: bool,
) -> Result<Vec<u64>, CrawlError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter() as u8)
        .quote(format.quote() as u8)
        .has_headers(has_headers)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut ids = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        match record.get(column).and_then(|f| f.trim().parse::<u64>().ok()) {
            Some(id) => ids.push(id),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(path = %path.display(), %skipped, "Skipped rows without a valid ID");
    }
    Ok(ids)
}

fn csv_error(path: &Path, e: csv::Error) -> CrawlError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => CrawlError::Io(io),
        other => CrawlError::StoreError(format!("{}: {other:?}", path.display())),
    }
}
