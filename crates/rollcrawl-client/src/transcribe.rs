use std::sync::Arc;

use rollcrawl_core::dsv::push_field;
use rollcrawl_core::error::CrawlError;
use rollcrawl_core::models::{FormatOptions, ID_COLUMN, ROLL_COLUMNS, Transcript, URL_COLUMN};
use rollcrawl_core::seen::{RawId, SeenIds};
use rollcrawl_core::traits::RollTranscriber;
use scraper::{ElementRef, Html, Selector};

use crate::resolve::RESULTS_TABLE_POSITION;

/// Transcribes the rolls table of a by-character page using scraper.
///
/// Cells are copied as inner markup, except the URL column which takes the
/// `href` of the first link in the cell. A row with missing cells is padded
/// with empty fields so every record keeps nine columns. Rows whose ID is
/// already in the seen set are not emitted again.
#[derive(Clone)]
pub struct ScraperTranscriber {
    anchor: Arc<Selector>,
}

impl ScraperTranscriber {
    pub fn new() -> Result<Self, CrawlError> {
        Ok(Self {
            anchor: Arc::new(parse_selector("a")?),
        })
    }

    fn cell_value(&self, cell: &ElementRef<'_>, column: usize) -> String {
        if column != URL_COLUMN {
            return cell.inner_html();
        }

        match cell
            .select(&self.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) => href.to_string(),
            None => {
                tracing::warn!(cell = %cell.inner_html(), "URL cell has no link");
                String::new()
            }
        }
    }
}

impl RollTranscriber for ScraperTranscriber {
    fn transcribe(
        &self,
        html: &str,
        table_offset: usize,
        format: &FormatOptions,
        seen: &mut SeenIds,
    ) -> Result<Transcript, CrawlError> {
        let position = RESULTS_TABLE_POSITION + table_offset;
        let table = parse_selector(&format!("body > center > table:nth-child({position})"))?;
        let rows = parse_selector(&format!(
            "body > center > table:nth-child({position}) > tbody > tr:not(:nth-child(1))"
        ))?;

        let document = Html::parse_document(html);
        if document.select(&table).next().is_none() {
            return Err(CrawlError::ParseDefect(format!(
                "rolls table not found at position {position}"
            )));
        }

        let mut transcript = Transcript::default();
        let mut skipped = 0usize;
        for row in document.select(&rows) {
            let cells: Vec<ElementRef<'_>> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|e| e.value().name() == "td")
                .collect();
            if cells.is_empty() {
                continue;
            }
            if cells.len() != ROLL_COLUMNS {
                tracing::warn!(
                    cells = cells.len(),
                    expected = ROLL_COLUMNS,
                    "Roll row has an unexpected number of cells"
                );
            }

            // The ID is recorded before anything of the row is emitted.
            let id = self.cell_value(&cells[ID_COLUMN], ID_COLUMN);
            match seen.record_raw(&id) {
                RawId::New(_) => {}
                RawId::Seen(_) => {
                    skipped += 1;
                    continue;
                }
                RawId::Invalid => tracing::warn!(raw = %id, "Roll ID is not numeric"),
            }
            push_field(&mut transcript.dsv, &id, ID_COLUMN, format);

            for column in ID_COLUMN + 1..ROLL_COLUMNS {
                let value = cells
                    .get(column)
                    .map(|cell| self.cell_value(cell, column))
                    .unwrap_or_default();
                push_field(&mut transcript.dsv, &value, column, format);
            }
            transcript.rows += 1;
        }

        if skipped > 0 {
            tracing::debug!(%skipped, "Skipped rolls already transcribed");
        }
        if transcript.rows == 0 {
            tracing::debug!(%position, "Rolls table has no new rows");
        }
        Ok(transcript)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector)
        .map_err(|e| CrawlError::ParseDefect(format!("Invalid selector '{selector}': {e}")))
}
