//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::CrawlError;
use crate::models::{CrawlOutput, FormatOptions, QueryKind, ResolvedCharacter, Transcript};
use crate::seen::SeenIds;
use crate::traits::{CharacterResolver, RecordStore, RollQuery, RollTranscriber};

// ---------------------------------------------------------------------------
// MockQuery
// ---------------------------------------------------------------------------

/// Mock remote client that returns queued responses and records every call.
#[derive(Clone)]
pub struct MockQuery {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, CrawlError>>>>,
    pub calls: Arc<Mutex<Vec<(QueryKind, String)>>>,
}

impl MockQuery {
    pub fn always_ok() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<Result<String, CrawlError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl RollQuery for MockQuery {
    async fn query(&self, kind: QueryKind, key: &str) -> Result<String, CrawlError> {
        self.calls.lock().unwrap().push((kind, key.to_string()));
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockResolver
// ---------------------------------------------------------------------------

/// Mock resolver that always returns the same character (or none).
#[derive(Clone)]
pub struct MockResolver {
    character: Option<ResolvedCharacter>,
}

impl MockResolver {
    pub fn new(character: Option<ResolvedCharacter>) -> Self {
        Self { character }
    }
}

impl CharacterResolver for MockResolver {
    fn resolve(&self, _html: &str) -> Option<ResolvedCharacter> {
        self.character.clone()
    }
}

// ---------------------------------------------------------------------------
// MockTranscriber
// ---------------------------------------------------------------------------

/// Mock transcriber that emits one minimal row per configured ID.
#[derive(Clone)]
pub struct MockTranscriber {
    /// Queue of per-call results. Each call pops the first element.
    results: Arc<Mutex<Vec<Result<Vec<u64>, CrawlError>>>>,
    /// Rows returned once the queue is empty.
    fallback: Vec<u64>,
    pub offsets: Arc<Mutex<Vec<usize>>>,
}

impl MockTranscriber {
    /// Returns the same rows on every call.
    pub fn with_rows(ids: &[u64]) -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::new())),
            fallback: ids.to_vec(),
            offsets: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns one batch per call, then no rows.
    pub fn with_batches(batches: Vec<Vec<u64>>) -> Self {
        Self::with_results(batches.into_iter().map(Ok).collect())
    }

    pub fn with_error(error: CrawlError) -> Self {
        Self::with_results(vec![Err(error)])
    }

    pub fn with_results(results: Vec<Result<Vec<u64>, CrawlError>>) -> Self {
        Self {
            results: Arc::new(Mutex::new(results)),
            fallback: Vec::new(),
            offsets: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl RollTranscriber for MockTranscriber {
    fn transcribe(
        &self,
        _html: &str,
        table_offset: usize,
        format: &FormatOptions,
        seen: &mut SeenIds,
    ) -> Result<Transcript, CrawlError> {
        self.offsets.lock().unwrap().push(table_offset);
        let ids = {
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                self.fallback.clone()
            } else {
                results.remove(0)?
            }
        };

        let d = format.delimiter();
        let mut transcript = Transcript::default();
        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            transcript
                .dsv
                .push_str(&format!("{id}{d}1{d}2{d}3{d}4{d}Aria{d}{d}roll{d}noon\n"));
            transcript.rows += 1;
        }
        Ok(transcript)
    }
}

// ---------------------------------------------------------------------------
// MockRecordStore
// ---------------------------------------------------------------------------

/// Mock store that records appended outputs.
#[derive(Clone)]
pub struct MockRecordStore {
    pub appended: Arc<Mutex<Vec<CrawlOutput>>>,
    error: Arc<Mutex<Option<CrawlError>>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self {
            appended: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Store that returns an error on the next append.
    pub fn with_error(error: CrawlError) -> Self {
        Self {
            appended: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl RecordStore for MockRecordStore {
    async fn append(&self, output: &CrawlOutput) -> Result<PathBuf, CrawlError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        self.appended.lock().unwrap().push(output.clone());
        Ok(PathBuf::from("mock.tsv"))
    }
}
