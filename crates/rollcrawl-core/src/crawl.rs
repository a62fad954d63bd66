use crate::error::{CrawlError, CrawlStage};
use crate::models::{CrawlOutput, FormatOptions, QueryKind};
use crate::seen::SeenIds;
use crate::traits::{CharacterResolver, RollQuery, RollTranscriber};

/// Runs one crawl cycle: ID lookup → resolve character → character lookup → transcribe.
///
/// Generic over the remote client and both extractors so each stage can be
/// replaced by a mock in tests. Every call is attempted exactly once; retry
/// policy belongs to the caller.
pub struct CrawlService<Q, R, T>
where
    Q: RollQuery,
    R: CharacterResolver,
    T: RollTranscriber,
{
    query: Q,
    resolver: R,
    transcriber: T,
}

impl<Q, R, T> CrawlService<Q, R, T>
where
    Q: RollQuery,
    R: CharacterResolver,
    T: RollTranscriber,
{
    pub fn new(query: Q, resolver: R, transcriber: T) -> Self {
        Self {
            query,
            resolver,
            transcriber,
        }
    }

    /// Crawl the roll history of the character owning `id`.
    ///
    /// 1. Query the by-ID form
    /// 2. Resolve the owning character (absent → `NotFound`)
    /// 3. Query the by-character form with the resolved name
    /// 4. Transcribe the rolls table, recording every row ID in `seen`
    pub async fn crawl(
        &self,
        id: u64,
        format: &FormatOptions,
        seen: &mut SeenIds,
    ) -> Result<CrawlOutput, CrawlError> {
        // 1. ID lookup
        tracing::debug!(%id, "Querying roll by ID");
        let html = self
            .query
            .query(QueryKind::ById, &id.to_string())
            .await
            .map_err(|e| e.at_stage(CrawlStage::IdLookup))?;

        // 2. Resolve
        let character = self
            .resolver
            .resolve(&html)
            .ok_or(CrawlError::NotFound(id))?;
        tracing::info!(
            %id,
            character = %character.display_name,
            decorated = character.decorated,
            "Resolved character"
        );

        // 3. Character lookup
        let html = self
            .query
            .query(QueryKind::ByCharacter, &character.name)
            .await
            .map_err(|e| e.at_stage(CrawlStage::CharacterLookup))?;
        tracing::debug!("Fetched {} bytes of roll history", html.len());

        // 4. Transcribe
        let transcript =
            self.transcriber
                .transcribe(&html, character.table_offset(), format, seen)?;
        tracing::info!(
            %id,
            rows = transcript.rows,
            seen = seen.len(),
            "Transcribed roll history"
        );

        Ok(CrawlOutput {
            id,
            character: character.name,
            display_name: character.display_name,
            dsv: transcript.dsv,
            rows: transcript.rows,
        })
    }
}
