use std::sync::Arc;

use rollcrawl_core::error::CrawlError;
use rollcrawl_core::models::ResolvedCharacter;
use rollcrawl_core::traits::CharacterResolver;
use scraper::{Html, Selector};

/// Child position of the results table inside `body > center` on both pages.
pub const RESULTS_TABLE_POSITION: usize = 3;

/// Name cell of the by-ID results: second row, sixth column.
const CHARACTER_CELL: &str = "body > center > table:nth-child(3) > tbody > tr:nth-child(2) > td:nth-child(6)";

/// Resolves the owning character from a by-ID page using scraper.
///
/// The page template is not valid HTML (no `tbody`, unclosed cells); the
/// html5ever tree builder repairs it the same way browsers do, so the cell is
/// addressed by its position in the repaired tree.
#[derive(Clone)]
pub struct ScraperResolver {
    cell: Arc<Selector>,
}

impl ScraperResolver {
    pub fn new() -> Result<Self, CrawlError> {
        let cell = Selector::parse(CHARACTER_CELL)
            .map_err(|e| CrawlError::ConfigError(format!("Invalid character selector: {e}")))?;
        Ok(Self {
            cell: Arc::new(cell),
        })
    }
}

impl CharacterResolver for ScraperResolver {
    fn resolve(&self, html: &str) -> Option<ResolvedCharacter> {
        let document = Html::parse_document(html);
        let cell = document.select(&self.cell).next()?;

        let name = cell.inner_html();
        let display_name = normalize_ws(&cell.text().collect::<String>());
        if name.trim().is_empty() {
            tracing::warn!("Character cell is present but empty");
            return None;
        }

        // A decorated name is the text plus exactly one wrapping tag.
        let children: Vec<_> = cell.children().collect();
        let decorated = children.len() == 2 && children.iter().any(|c| c.value().is_element());

        Some(ResolvedCharacter {
            name,
            display_name,
            decorated,
        })
    }
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
