use std::future::Future;
use std::path::PathBuf;

use crate::error::CrawlError;
use crate::models::{CrawlOutput, FormatOptions, QueryKind, ResolvedCharacter, Transcript};
use crate::seen::SeenIds;

/// Submits one of the remote lookup forms and returns the raw response body.
///
/// Implementations never interpret the body and never retry.
pub trait RollQuery: Send + Sync + Clone {
    fn query(
        &self,
        kind: QueryKind,
        key: &str,
    ) -> impl Future<Output = Result<String, CrawlError>> + Send;
}

/// Finds the character owning a roll on a by-ID page.
pub trait CharacterResolver: Send + Sync + Clone {
    /// Returns `None` when the page is the "no such ID" variant.
    fn resolve(&self, html: &str) -> Option<ResolvedCharacter>;
}

/// Turns the rolls table of a by-character page into DSV records.
pub trait RollTranscriber: Send + Sync + Clone {
    /// Records every row ID in `seen`. Rows whose ID was already there are
    /// left out of the transcript.
    ///
    /// Fails with [`CrawlError::ParseDefect`] only when the rolls table itself
    /// cannot be located; defects inside a row degrade to empty fields.
    fn transcribe(
        &self,
        html: &str,
        table_offset: usize,
        format: &FormatOptions,
        seen: &mut SeenIds,
    ) -> Result<Transcript, CrawlError>;
}

/// Persists the records of a successful crawl cycle.
pub trait RecordStore: Send + Sync + Clone {
    /// Appends the cycle's records, writing a header first if the target file
    /// does not exist yet. Returns the file written to.
    fn append(
        &self,
        output: &CrawlOutput,
    ) -> impl Future<Output = Result<PathBuf, CrawlError>> + Send;
}

